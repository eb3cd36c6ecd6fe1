use std::rc::Rc;

use pest::error::{Error, ErrorVariant, LineColLocation};
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::{Parser, Span};
use pest_derive::Parser;

use super::ast::*;

#[derive(Parser)]
#[grammar = "parser/script.pest"] // relative to src
pub struct ScriptParser;

type ParseResult<T> = Result<T, Error<Rule>>;

lazy_static! {
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::or, Assoc::Left))
        .op(Op::infix(Rule::and, Assoc::Left))
        .op(Op::infix(Rule::strict_eq, Assoc::Left)
            | Op::infix(Rule::strict_ne, Assoc::Left)
            | Op::infix(Rule::eq, Assoc::Left)
            | Op::infix(Rule::ne, Assoc::Left))
        .op(Op::infix(Rule::lt, Assoc::Left)
            | Op::infix(Rule::le, Assoc::Left)
            | Op::infix(Rule::gt, Assoc::Left)
            | Op::infix(Rule::ge, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left)
            | Op::infix(Rule::div, Assoc::Left)
            | Op::infix(Rule::rem, Assoc::Left))
        .op(Op::prefix(Rule::not) | Op::prefix(Rule::neg) | Op::prefix(Rule::typeof_op));
}

impl ScriptParser {
    /// Parse a whole script into its statement list.
    pub fn parse_to_ast(script: &str) -> ParseResult<ProgramData> {
        let mut pairs = ScriptParser::parse(Rule::script, script)?;
        let body = match pairs.next() {
            Some(script_pair) => build_statements(script_pair.into_inner())?,
            None => vec![],
        };
        Ok(ProgramData { body })
    }
}

/// Render a pest error as a one-line message with its location.
pub fn describe_parse_error(error: &Error<Rule>) -> String {
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    let message = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            format!("expected one of {:?}", positives)
        }
        variant => variant.message().to_string(),
    };
    format!("{} at line {}, column {}", message, line, column)
}

fn custom_error(span: Span, message: &str) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: message.to_string(),
        },
        span,
    )
}

fn get_unexpected_error(pair: &Pair<Rule>) -> Error<Rule> {
    custom_error(pair.as_span(), &format!("Unexpected {:?}", pair.as_rule()))
}

fn expect_next<'i>(pairs: &mut Pairs<'i, Rule>, parent: Span<'i>) -> ParseResult<Pair<'i, Rule>> {
    pairs
        .next()
        .ok_or_else(|| custom_error(parent, "Incomplete syntax"))
}

fn build_statements(pairs: Pairs<Rule>) -> ParseResult<Vec<StatementType>> {
    let mut statements = vec![];
    for pair in pairs {
        if pair.as_rule() == Rule::EOI {
            continue;
        }
        statements.push(build_statement(pair)?);
    }
    Ok(statements)
}

fn build_statement(pair: Pair<Rule>) -> ParseResult<StatementType> {
    let span = pair.as_span();
    Ok(match pair.as_rule() {
        Rule::expression_statement => {
            let mut inner = pair.into_inner();
            StatementType::ExpressionStatement(build_expression(expect_next(&mut inner, span)?)?)
        }
        Rule::variable_statement => {
            let mut inner = pair.into_inner();
            let kind = match expect_next(&mut inner, span)?.as_str() {
                "var" => VariableDeclarationKind::Var,
                "let" => VariableDeclarationKind::Let,
                _ => VariableDeclarationKind::Const,
            };
            let mut declarations = vec![];
            for declaration in inner {
                let declaration_span = declaration.as_span();
                let mut parts = declaration.into_inner();
                let name = expect_next(&mut parts, declaration_span)?.as_str().to_string();
                let init = match parts.next() {
                    Some(expression) => Some(build_expression(expression)?),
                    None => None,
                };
                if init.is_none() && kind == VariableDeclarationKind::Const {
                    return Err(custom_error(
                        declaration_span,
                        "Missing initializer in const declaration",
                    ));
                }
                declarations.push(VariableDeclarationData { name, init });
            }
            StatementType::VariableDeclaration { kind, declarations }
        }
        Rule::function_declaration => StatementType::FunctionDeclaration(Rc::new(build_function(pair)?)),
        Rule::return_statement => {
            let mut inner = pair.into_inner().skip(1);
            match inner.next() {
                Some(argument) => StatementType::ReturnStatement(Some(build_expression(argument)?)),
                None => StatementType::ReturnStatement(None),
            }
        }
        Rule::if_statement => {
            let mut inner = pair.into_inner();
            let _ = expect_next(&mut inner, span)?;
            let test = build_expression(expect_next(&mut inner, span)?)?;
            let consequent = Box::new(build_statement(expect_next(&mut inner, span)?)?);
            let alternate = match inner.nth(1) {
                Some(alternate) => Some(Box::new(build_statement(alternate)?)),
                None => None,
            };
            StatementType::IfStatement {
                test,
                consequent,
                alternate,
            }
        }
        Rule::throw_statement => {
            let mut inner = pair.into_inner().skip(1);
            match inner.next() {
                Some(argument) => StatementType::ThrowStatement(build_expression(argument)?),
                None => return Err(custom_error(span, "Missing throw argument")),
            }
        }
        Rule::block => StatementType::BlockStatement(build_statements(pair.into_inner())?),
        Rule::empty_statement => StatementType::EmptyStatement,
        _ => return Err(get_unexpected_error(&pair)),
    })
}

fn build_function(pair: Pair<Rule>) -> ParseResult<FunctionData> {
    let span = pair.as_span();
    let mut name = None;
    let mut params = vec![];
    let mut body = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::kw_function => { /* keyword token */ }
            Rule::identifier => name = Some(part.as_str().to_string()),
            Rule::params => params = part.into_inner().map(|p| p.as_str().to_string()).collect(),
            Rule::function_body => {
                body = Some(FunctionBodyData::Block(build_statements(part.into_inner())?))
            }
            _ => return Err(get_unexpected_error(&part)),
        }
    }
    match body {
        Some(body) => Ok(FunctionData {
            name,
            params,
            body,
            is_arrow: false,
        }),
        None => Err(custom_error(span, "Missing function body")),
    }
}

fn build_arrow_function(pair: Pair<Rule>) -> ParseResult<FunctionData> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let params = expect_next(&mut inner, span)?
        .into_inner()
        .map(|p| p.as_str().to_string())
        .collect();
    let body_pair = expect_next(&mut inner, span)?;
    let body = if body_pair.as_rule() == Rule::function_body {
        FunctionBodyData::Block(build_statements(body_pair.into_inner())?)
    } else {
        FunctionBodyData::Expression(Box::new(build_expression(body_pair)?))
    };
    Ok(FunctionData {
        name: None,
        params,
        body,
        is_arrow: true,
    })
}

fn build_expression(pair: Pair<Rule>) -> ParseResult<ExpressionType> {
    let span = pair.as_span();
    match pair.as_rule() {
        Rule::arrow_function => Ok(ExpressionType::FunctionExpression(Rc::new(
            build_arrow_function(pair)?,
        ))),
        Rule::assignment => {
            let mut inner = pair.into_inner();
            let target_pair = expect_next(&mut inner, span)?;
            let target_span = target_pair.as_span();
            let target = build_postfix(target_pair)?;
            if !matches!(
                target,
                ExpressionType::Identifier(_) | ExpressionType::MemberExpression { .. }
            ) {
                return Err(custom_error(target_span, "Invalid assignment target"));
            }
            let operator = match expect_next(&mut inner, span)?.as_str() {
                "+=" => AssignmentOperator::AddEquals,
                "-=" => AssignmentOperator::SubtractEquals,
                _ => AssignmentOperator::Equals,
            };
            let value = build_expression(expect_next(&mut inner, span)?)?;
            Ok(ExpressionType::AssignmentExpression {
                operator,
                target: Box::new(target),
                value: Box::new(value),
            })
        }
        Rule::conditional => {
            let mut inner = pair.into_inner();
            let test = build_binary(expect_next(&mut inner, span)?)?;
            match inner.next() {
                Some(consequent) => {
                    let consequent = build_expression(consequent)?;
                    let alternate = build_expression(expect_next(&mut inner, span)?)?;
                    Ok(ExpressionType::ConditionalExpression {
                        test: Box::new(test),
                        consequent: Box::new(consequent),
                        alternate: Box::new(alternate),
                    })
                }
                None => Ok(test),
            }
        }
        Rule::binary => build_binary(pair),
        Rule::postfix => build_postfix(pair),
        _ => Err(get_unexpected_error(&pair)),
    }
}

fn build_binary(pair: Pair<Rule>) -> ParseResult<ExpressionType> {
    PRATT_PARSER
        .map_primary(build_postfix)
        .map_prefix(|op, argument| {
            let operator = match op.as_rule() {
                Rule::not => UnaryOperator::Not,
                Rule::neg => UnaryOperator::Minus,
                Rule::typeof_op => UnaryOperator::TypeOf,
                _ => return Err(get_unexpected_error(&op)),
            };
            Ok(ExpressionType::UnaryExpression {
                operator,
                argument: Box::new(argument?),
            })
        })
        .map_infix(|left, op, right| {
            let left = Box::new(left?);
            let right = Box::new(right?);
            let operator = match op.as_rule() {
                Rule::or => {
                    return Ok(ExpressionType::LogicalExpression {
                        operator: LogicalOperator::Or,
                        left,
                        right,
                    })
                }
                Rule::and => {
                    return Ok(ExpressionType::LogicalExpression {
                        operator: LogicalOperator::And,
                        left,
                        right,
                    })
                }
                Rule::strict_eq => BinaryOperator::StrictlyEqual,
                Rule::strict_ne => BinaryOperator::StrictlyUnequal,
                Rule::eq => BinaryOperator::Equal,
                Rule::ne => BinaryOperator::NotEqual,
                Rule::lt => BinaryOperator::LessThan,
                Rule::le => BinaryOperator::LessThanEqual,
                Rule::gt => BinaryOperator::GreaterThan,
                Rule::ge => BinaryOperator::GreaterThanEqual,
                Rule::add => BinaryOperator::Add,
                Rule::sub => BinaryOperator::Subtract,
                Rule::mul => BinaryOperator::Multiply,
                Rule::div => BinaryOperator::Divide,
                Rule::rem => BinaryOperator::Remainder,
                _ => return Err(get_unexpected_error(&op)),
            };
            Ok(ExpressionType::BinaryExpression {
                operator,
                left,
                right,
            })
        })
        .parse(pair.into_inner())
}

fn build_postfix(pair: Pair<Rule>) -> ParseResult<ExpressionType> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let mut expression = build_primary(expect_next(&mut inner, span)?)?;
    for op in inner {
        let op_span = op.as_span();
        expression = match op.as_rule() {
            Rule::call_arguments => ExpressionType::CallExpression {
                callee: Box::new(expression),
                arguments: op
                    .into_inner()
                    .map(build_expression)
                    .collect::<ParseResult<Vec<_>>>()?,
            },
            Rule::member_dot => {
                let mut parts = op.into_inner();
                ExpressionType::MemberExpression {
                    object: Box::new(expression),
                    property: MemberProperty::Named(
                        expect_next(&mut parts, op_span)?.as_str().to_string(),
                    ),
                }
            }
            Rule::member_index => {
                let mut parts = op.into_inner();
                ExpressionType::MemberExpression {
                    object: Box::new(expression),
                    property: MemberProperty::Computed(Box::new(build_expression(
                        expect_next(&mut parts, op_span)?,
                    )?)),
                }
            }
            _ => return Err(get_unexpected_error(&op)),
        };
    }
    Ok(expression)
}

fn build_primary(pair: Pair<Rule>) -> ParseResult<ExpressionType> {
    let span = pair.as_span();
    Ok(match pair.as_rule() {
        Rule::function_expression => ExpressionType::FunctionExpression(Rc::new(build_function(pair)?)),
        Rule::array_literal => ExpressionType::ArrayExpression(
            pair.into_inner()
                .map(build_expression)
                .collect::<ParseResult<Vec<_>>>()?,
        ),
        Rule::object_literal => {
            let mut properties = vec![];
            for property in pair.into_inner() {
                let property_span = property.as_span();
                let mut parts = property.into_inner();
                let key = expect_next(&mut parts, property_span)?;
                match parts.next() {
                    Some(value) => {
                        let name = match key.as_rule() {
                            Rule::string_literal => build_string(key)?,
                            _ => key.as_str().to_string(),
                        };
                        properties.push((name, build_expression(value)?));
                    }
                    None => {
                        // shorthand `{ name }`
                        let name = key.as_str().to_string();
                        properties.push((name.clone(), ExpressionType::Identifier(name)));
                    }
                }
            }
            ExpressionType::ObjectExpression(properties)
        }
        Rule::number_literal => {
            let value = pair
                .as_str()
                .parse::<f64>()
                .map_err(|_| custom_error(span, "Invalid number literal"))?;
            ExpressionType::Literal(LiteralType::Number(value))
        }
        Rule::string_literal => ExpressionType::Literal(LiteralType::String(build_string(pair)?)),
        Rule::boolean_literal => ExpressionType::Literal(LiteralType::Boolean(pair.as_str() == "true")),
        Rule::null_literal => ExpressionType::Literal(LiteralType::Null),
        Rule::undefined_literal => ExpressionType::Literal(LiteralType::Undefined),
        Rule::this_expression => ExpressionType::ThisExpression,
        Rule::identifier => ExpressionType::Identifier(pair.as_str().to_string()),
        Rule::parenthesized => {
            let mut inner = pair.into_inner();
            build_expression(expect_next(&mut inner, span)?)?
        }
        _ => return Err(get_unexpected_error(&pair)),
    })
}

fn build_string(pair: Pair<Rule>) -> ParseResult<String> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let raw = expect_next(&mut inner, span)?;
    unescape(raw.as_str()).ok_or_else(|| custom_error(span, "Invalid escape sequence"))
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                out.push(char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?);
            }
            other => out.push(other),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::unescape;

    #[test]
    fn test_unescape_sequences() {
        assert_eq!(unescape(r"a\nb").unwrap(), "a\nb");
        assert_eq!(unescape(r"it\'s").unwrap(), "it's");
        assert_eq!(unescape(r"\u0041").unwrap(), "A");
        assert!(unescape(r"\u00").is_none());
    }
}
