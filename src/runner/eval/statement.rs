//! Statement execution.
//!
//! This module provides statement execution logic for the script evaluator.

use std::rc::Rc;

use crate::parser::ast::{ProgramData, StatementType, VariableDeclarationKind};
use crate::runner::ds::error::ScriptError;
use crate::runner::ds::scope::Scope;
use crate::runner::ds::value::ScriptValue;

use super::expression::evaluate_expression;
use super::function::create_function;
use super::types::{Completion, EvalResult, ValueResult};

/// Run a whole program.
///
/// The result is the value of a top-level `return`, or else the value of the
/// last statement when that is an expression other than an assignment.
pub fn run_program(program: &ProgramData, scope: &Rc<Scope>) -> ValueResult {
    hoist_declarations(&program.body, scope);
    let last = program.body.len().saturating_sub(1);
    let mut result = ScriptValue::Undefined;
    for (index, stmt) in program.body.iter().enumerate() {
        let completion = execute_statement(stmt, scope)?;
        if completion.is_return() {
            return Ok(completion.into_value());
        }
        if index == last {
            if let StatementType::ExpressionStatement(expression) = stmt {
                if !expression.is_assignment() {
                    result = completion.into_value();
                }
            }
        }
    }
    Ok(result)
}

/// Bind function declarations before the statements of a list run.
pub fn hoist_declarations(statements: &[StatementType], scope: &Rc<Scope>) {
    for stmt in statements {
        if let StatementType::FunctionDeclaration(data) = stmt {
            if let Some(name) = &data.name {
                scope.declare(name, create_function(data, scope), false);
            }
        }
    }
}

/// Execute a statement list in order, stopping at the first return.
pub fn execute_statements(statements: &[StatementType], scope: &Rc<Scope>) -> EvalResult {
    hoist_declarations(statements, scope);
    for stmt in statements {
        let completion = execute_statement(stmt, scope)?;
        if completion.is_return() {
            return Ok(completion);
        }
    }
    Ok(Completion::normal())
}

/// Execute a statement and return its completion.
pub fn execute_statement(stmt: &StatementType, scope: &Rc<Scope>) -> EvalResult {
    match stmt {
        StatementType::EmptyStatement => Ok(Completion::normal()),

        StatementType::ExpressionStatement(expression) => {
            let value = evaluate_expression(expression, scope)?;
            Ok(Completion::normal_with_value(value))
        }

        StatementType::VariableDeclaration { kind, declarations } => {
            let constant = *kind == VariableDeclarationKind::Const;
            for declaration in declarations {
                let value = match &declaration.init {
                    Some(init) => evaluate_expression(init, scope)?,
                    None => ScriptValue::Undefined,
                };
                scope.declare(&declaration.name, value, constant);
            }
            Ok(Completion::normal())
        }

        // Bound by hoist_declarations.
        StatementType::FunctionDeclaration(_) => Ok(Completion::normal()),

        StatementType::ReturnStatement(argument) => {
            let value = match argument {
                Some(argument) => evaluate_expression(argument, scope)?,
                None => ScriptValue::Undefined,
            };
            Ok(Completion::return_value(value))
        }

        StatementType::IfStatement {
            test,
            consequent,
            alternate,
        } => {
            if evaluate_expression(test, scope)?.is_truthy() {
                execute_statement(consequent, scope)
            } else if let Some(alternate) = alternate {
                execute_statement(alternate, scope)
            } else {
                Ok(Completion::normal())
            }
        }

        StatementType::ThrowStatement(argument) => {
            let value = evaluate_expression(argument, scope)?;
            Err(ScriptError::Thrown(value.to_js_string()))
        }

        StatementType::BlockStatement(statements) => {
            let block_scope = Scope::block(scope);
            execute_statements(statements, &block_scope)
        }
    }
}
