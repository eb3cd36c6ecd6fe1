//! Expression evaluation.

use std::rc::Rc;

use crate::parser::ast::{
    AssignmentOperator, BinaryOperator, ExpressionType, LiteralType, LogicalOperator,
    MemberProperty, UnaryOperator,
};
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::object::ObjectData;
use crate::runner::ds::scope::Scope;
use crate::runner::ds::value::ScriptValue;
use crate::runner::std_lib::{array, string};

use super::function::{call_value, create_function};
use super::types::ValueResult;

/// Longest a list may grow through an index write.
pub const MAX_LIST_LENGTH: usize = 1 << 20;

/// Evaluate an expression and return its value.
pub fn evaluate_expression(expr: &ExpressionType, scope: &Rc<Scope>) -> ValueResult {
    match expr {
        ExpressionType::Literal(literal) => Ok(evaluate_literal(literal)),

        ExpressionType::Identifier(name) => scope.lookup(name),

        ExpressionType::ThisExpression => Ok(scope.this_value()),

        ExpressionType::ArrayExpression(elements) => {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                items.push(evaluate_expression(element, scope)?);
            }
            Ok(ScriptValue::new_list(items))
        }

        ExpressionType::ObjectExpression(properties) => {
            let mut data = ObjectData::new();
            for (key, value) in properties {
                data.set(key, evaluate_expression(value, scope)?);
            }
            Ok(ScriptValue::from_object(data))
        }

        ExpressionType::FunctionExpression(data) => Ok(create_function(data, scope)),

        ExpressionType::UnaryExpression { operator, argument } => {
            evaluate_unary_expression(*operator, argument, scope)
        }

        ExpressionType::BinaryExpression {
            operator,
            left,
            right,
        } => {
            let left = evaluate_expression(left, scope)?;
            let right = evaluate_expression(right, scope)?;
            Ok(apply_binary_operator(*operator, &left, &right))
        }

        ExpressionType::LogicalExpression {
            operator,
            left,
            right,
        } => {
            let left = evaluate_expression(left, scope)?;
            match (operator, left.is_truthy()) {
                (LogicalOperator::And, false) | (LogicalOperator::Or, true) => Ok(left),
                _ => evaluate_expression(right, scope),
            }
        }

        ExpressionType::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => {
            if evaluate_expression(test, scope)?.is_truthy() {
                evaluate_expression(consequent, scope)
            } else {
                evaluate_expression(alternate, scope)
            }
        }

        ExpressionType::AssignmentExpression {
            operator,
            target,
            value,
        } => evaluate_assignment(*operator, target, value, scope),

        ExpressionType::MemberExpression { object, property } => {
            let object = evaluate_expression(object, scope)?;
            let key = property_key(property, scope)?;
            get_member(&object, &key)
        }

        ExpressionType::CallExpression { callee, arguments } => {
            let (function, this_value) = match callee.as_ref() {
                ExpressionType::MemberExpression { object, property } => {
                    let object = evaluate_expression(object, scope)?;
                    let key = property_key(property, scope)?;
                    (get_member(&object, &key)?, object)
                }
                other => (evaluate_expression(other, scope)?, ScriptValue::Undefined),
            };
            let mut args = Vec::with_capacity(arguments.len());
            for argument in arguments {
                args.push(evaluate_expression(argument, scope)?);
            }
            call_value(&function, &describe_callee(callee), this_value, args)
        }
    }
}

fn evaluate_literal(literal: &LiteralType) -> ScriptValue {
    match literal {
        LiteralType::Undefined => ScriptValue::Undefined,
        LiteralType::Null => ScriptValue::Null,
        LiteralType::Boolean(b) => ScriptValue::Boolean(*b),
        LiteralType::Number(n) => ScriptValue::Number(*n),
        LiteralType::String(s) => ScriptValue::String(s.clone()),
    }
}

fn evaluate_unary_expression(
    operator: UnaryOperator,
    argument: &ExpressionType,
    scope: &Rc<Scope>,
) -> ValueResult {
    match operator {
        UnaryOperator::Not => Ok(ScriptValue::Boolean(
            !evaluate_expression(argument, scope)?.is_truthy(),
        )),
        UnaryOperator::Minus => Ok(ScriptValue::Number(
            -evaluate_expression(argument, scope)?.to_number(),
        )),
        UnaryOperator::TypeOf => {
            // typeof on an undeclared name is not a reference error
            let value = match argument {
                ExpressionType::Identifier(name) => {
                    scope.try_lookup(name).unwrap_or(ScriptValue::Undefined)
                }
                other => evaluate_expression(other, scope)?,
            };
            Ok(ScriptValue::String(value.type_of().to_string()))
        }
    }
}

/// Apply a binary operator to two evaluated operands.
pub fn apply_binary_operator(
    operator: BinaryOperator,
    left: &ScriptValue,
    right: &ScriptValue,
) -> ScriptValue {
    match operator {
        BinaryOperator::Add => add(left, right),
        BinaryOperator::Subtract => ScriptValue::Number(left.to_number() - right.to_number()),
        BinaryOperator::Multiply => ScriptValue::Number(left.to_number() * right.to_number()),
        BinaryOperator::Divide => ScriptValue::Number(left.to_number() / right.to_number()),
        BinaryOperator::Remainder => ScriptValue::Number(left.to_number() % right.to_number()),
        BinaryOperator::Equal => ScriptValue::Boolean(left.loose_equals(right)),
        BinaryOperator::NotEqual => ScriptValue::Boolean(!left.loose_equals(right)),
        BinaryOperator::StrictlyEqual => ScriptValue::Boolean(left.strict_equals(right)),
        BinaryOperator::StrictlyUnequal => ScriptValue::Boolean(!left.strict_equals(right)),
        BinaryOperator::LessThan
        | BinaryOperator::LessThanEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanEqual => ScriptValue::Boolean(compare(operator, left, right)),
    }
}

fn add(left: &ScriptValue, right: &ScriptValue) -> ScriptValue {
    let is_textual = |v: &ScriptValue| {
        matches!(
            v,
            ScriptValue::String(_) | ScriptValue::List(_) | ScriptValue::Object(_)
        )
    };
    if is_textual(left) || is_textual(right) {
        ScriptValue::String(format!("{}{}", left.to_js_string(), right.to_js_string()))
    } else {
        ScriptValue::Number(left.to_number() + right.to_number())
    }
}

fn compare(operator: BinaryOperator, left: &ScriptValue, right: &ScriptValue) -> bool {
    if let (ScriptValue::String(a), ScriptValue::String(b)) = (left, right) {
        return match operator {
            BinaryOperator::LessThan => a < b,
            BinaryOperator::LessThanEqual => a <= b,
            BinaryOperator::GreaterThan => a > b,
            _ => a >= b,
        };
    }
    let (a, b) = (left.to_number(), right.to_number());
    match operator {
        BinaryOperator::LessThan => a < b,
        BinaryOperator::LessThanEqual => a <= b,
        BinaryOperator::GreaterThan => a > b,
        _ => a >= b,
    }
}

fn evaluate_assignment(
    operator: AssignmentOperator,
    target: &ExpressionType,
    value: &ExpressionType,
    scope: &Rc<Scope>,
) -> ValueResult {
    match target {
        ExpressionType::Identifier(name) => {
            let rhs = evaluate_expression(value, scope)?;
            let value = match operator {
                AssignmentOperator::Equals => rhs,
                _ => combine(operator, &scope.lookup(name)?, &rhs),
            };
            scope.assign(name, value.clone())?;
            Ok(value)
        }
        ExpressionType::MemberExpression { object, property } => {
            let object = evaluate_expression(object, scope)?;
            let key = property_key(property, scope)?;
            let rhs = evaluate_expression(value, scope)?;
            let value = match operator {
                AssignmentOperator::Equals => rhs,
                _ => combine(operator, &get_member(&object, &key)?, &rhs),
            };
            set_member(&object, &key, value.clone())?;
            Ok(value)
        }
        _ => Err(ScriptError::Syntax("Invalid assignment target".to_string())),
    }
}

fn combine(operator: AssignmentOperator, current: &ScriptValue, rhs: &ScriptValue) -> ScriptValue {
    match operator {
        AssignmentOperator::SubtractEquals => {
            apply_binary_operator(BinaryOperator::Subtract, current, rhs)
        }
        _ => apply_binary_operator(BinaryOperator::Add, current, rhs),
    }
}

fn property_key(property: &MemberProperty, scope: &Rc<Scope>) -> Result<String, ScriptError> {
    match property {
        MemberProperty::Named(name) => Ok(name.clone()),
        MemberProperty::Computed(expression) => {
            Ok(evaluate_expression(expression, scope)?.to_property_key())
        }
    }
}

fn parse_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    key.parse::<usize>().ok()
}

/// Read `object[key]`, including the built-in members of lists and strings.
pub fn get_member(object: &ScriptValue, key: &str) -> ValueResult {
    match object {
        ScriptValue::Undefined | ScriptValue::Null => Err(ScriptError::Type(format!(
            "Cannot read properties of {} (reading '{}')",
            object.to_js_string(),
            key
        ))),
        ScriptValue::Object(data) => Ok(data.borrow().get(key).unwrap_or(ScriptValue::Undefined)),
        ScriptValue::List(list) => {
            if key == "length" {
                return Ok(ScriptValue::Number(list.borrow().len() as f64));
            }
            if let Some(index) = parse_index(key) {
                return Ok(list
                    .borrow()
                    .get(index)
                    .cloned()
                    .unwrap_or(ScriptValue::Undefined));
            }
            Ok(array::get_method(list, key).unwrap_or(ScriptValue::Undefined))
        }
        ScriptValue::String(s) => {
            if key == "length" {
                return Ok(ScriptValue::Number(s.chars().count() as f64));
            }
            if let Some(index) = parse_index(key) {
                return Ok(s
                    .chars()
                    .nth(index)
                    .map_or(ScriptValue::Undefined, |c| ScriptValue::String(c.to_string())));
            }
            Ok(string::get_method(s, key).unwrap_or(ScriptValue::Undefined))
        }
        ScriptValue::Function(function) if key == "name" => {
            Ok(ScriptValue::String(function.name.clone()))
        }
        _ => Ok(ScriptValue::Undefined),
    }
}

/// Write `object[key] = value`. Writes to primitives are ignored.
pub fn set_member(object: &ScriptValue, key: &str, value: ScriptValue) -> Result<(), ScriptError> {
    match object {
        ScriptValue::Undefined | ScriptValue::Null => Err(ScriptError::Type(format!(
            "Cannot set properties of {} (setting '{}')",
            object.to_js_string(),
            key
        ))),
        ScriptValue::Object(data) => {
            data.borrow_mut().set(key, value);
            Ok(())
        }
        ScriptValue::List(list) => {
            if let Some(index) = parse_index(key) {
                let mut list = list.borrow_mut();
                if index >= list.len() {
                    if index >= MAX_LIST_LENGTH {
                        return Err(ScriptError::Thrown(format!(
                            "RangeError: Invalid array index {}",
                            index
                        )));
                    }
                    list.resize(index + 1, ScriptValue::Undefined);
                }
                list[index] = value;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn describe_callee(callee: &ExpressionType) -> String {
    match callee {
        ExpressionType::Identifier(name) => name.clone(),
        ExpressionType::MemberExpression { object, property } => {
            let property = match property {
                MemberProperty::Named(name) => name.clone(),
                MemberProperty::Computed(_) => "[...]".to_string(),
            };
            format!("{}.{}", describe_callee(object), property)
        }
        ExpressionType::ThisExpression => "this".to_string(),
        _ => "expression".to_string(),
    }
}
