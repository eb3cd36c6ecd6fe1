use std::rc::Rc;

/// A parsed script: the top-level statement list.
#[derive(Debug)]
pub struct ProgramData {
    pub body: Vec<StatementType>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

#[derive(Debug)]
pub struct VariableDeclarationData {
    pub name: String,
    pub init: Option<ExpressionType>,
}

#[derive(Debug)]
pub enum StatementType {
    ExpressionStatement(ExpressionType),
    VariableDeclaration {
        kind: VariableDeclarationKind,
        declarations: Vec<VariableDeclarationData>,
    },
    FunctionDeclaration(Rc<FunctionData>),
    ReturnStatement(Option<ExpressionType>),
    IfStatement {
        test: ExpressionType,
        consequent: Box<StatementType>,
        alternate: Option<Box<StatementType>>,
    },
    ThrowStatement(ExpressionType),
    BlockStatement(Vec<StatementType>),
    EmptyStatement,
}

#[derive(Debug)]
pub enum FunctionBodyData {
    Block(Vec<StatementType>),
    /// Concise arrow body: `x => x + 1`.
    Expression(Box<ExpressionType>),
}

#[derive(Debug)]
pub struct FunctionData {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: FunctionBodyData,
    /// Arrow functions take `this` from the defining scope.
    pub is_arrow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Not,
    Minus,
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    StrictlyEqual,
    StrictlyUnequal,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignmentOperator {
    Equals,
    AddEquals,
    SubtractEquals,
}

#[derive(Debug)]
pub enum MemberProperty {
    /// `object.name`
    Named(String),
    /// `object[expression]`
    Computed(Box<ExpressionType>),
}

#[derive(Debug)]
pub enum ExpressionType {
    Literal(LiteralType),
    Identifier(String),
    ThisExpression,
    ArrayExpression(Vec<ExpressionType>),
    ObjectExpression(Vec<(String, ExpressionType)>),
    FunctionExpression(Rc<FunctionData>),
    UnaryExpression {
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    ConditionalExpression {
        test: Box<ExpressionType>,
        consequent: Box<ExpressionType>,
        alternate: Box<ExpressionType>,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        target: Box<ExpressionType>,
        value: Box<ExpressionType>,
    },
    MemberExpression {
        object: Box<ExpressionType>,
        property: MemberProperty,
    },
    CallExpression {
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
}

impl ExpressionType {
    pub fn is_assignment(&self) -> bool {
        matches!(self, ExpressionType::AssignmentExpression { .. })
    }
}
