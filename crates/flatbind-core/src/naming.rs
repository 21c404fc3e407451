//! Symbol naming.
//!
//! Every export gets a flat C symbol `{Class}_{Member}_{codes}`, one code
//! letter per declared parameter (`0` when there are none). Constructors use
//! the class name as the member; the release path is always `{Class}_delete`
//! and free functions take the configured global prefix in the class slot.
//! Two declarations that spell the same symbol are a fatal collision: the
//! boundary has no overloading to fall back on.

use std::collections::HashMap;

use flatbind_model::PrimitiveKind;
use tracing::debug;

use crate::classify::Subject;
use crate::error::{BindError, Result};
use crate::policy::{ExportKind, ParamMarshal, ParamStrategy, ResolvedFunction};

/// A resolved function with its final symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFunction {
    pub symbol: String,
    pub function: ResolvedFunction,
}

/// Assigns symbols for one generation run.
pub struct NameResolver<'c> {
    global_prefix: &'c str,
}

impl<'c> NameResolver<'c> {
    pub fn new(global_prefix: &'c str) -> Self {
        Self { global_prefix }
    }

    /// The code letter a parameter contributes, or `None` for the target
    /// and out-buffer plumbing.
    pub fn param_code(param: &ParamMarshal) -> Option<char> {
        let code = match param.strategy {
            ParamStrategy::Target | ParamStrategy::OutBuffer | ParamStrategy::OutCapacity => {
                return None;
            }
            ParamStrategy::Direct => match &param.subject {
                Subject::Bool => 'b',
                Subject::Primitive { kind, .. } => match kind {
                    PrimitiveKind::Signed => 'i',
                    PrimitiveKind::Unsigned => 'u',
                    PrimitiveKind::Float => 'f',
                    PrimitiveKind::Char => 'c',
                    PrimitiveKind::Size => 'z',
                },
                // direct passing only ever carries primitives and booleans
                _ => 'i',
            },
            ParamStrategy::EnumCast => 'e',
            ParamStrategy::TextIn => 's',
            ParamStrategy::DerefCopy => 'S',
            ParamStrategy::BorrowRef | ParamStrategy::BorrowPointer => 'p',
        };
        Some(code)
    }

    /// The symbol for one function, without collision checking.
    pub fn symbol(&self, function: &ResolvedFunction) -> String {
        let class = function.class.as_deref().unwrap_or(self.global_prefix);
        if function.kind == ExportKind::Destructor {
            return format!("{class}_delete");
        }
        let member = match function.kind {
            ExportKind::Constructor | ExportKind::CopyConstructor => class,
            _ => function.member.as_str(),
        };
        let codes: String = function.params.iter().filter_map(Self::param_code).collect();
        let codes = if codes.is_empty() { "0".to_string() } else { codes };
        format!("{class}_{member}_{codes}")
    }

    /// Name every function, in order, rejecting any symbol spelled twice.
    pub fn assign(&self, functions: Vec<ResolvedFunction>) -> Result<Vec<ExportedFunction>> {
        let mut seen: HashMap<String, usize> = HashMap::with_capacity(functions.len());
        let mut exports: Vec<ExportedFunction> = Vec::with_capacity(functions.len());

        for function in functions {
            let symbol = self.symbol(&function);
            if let Some(&index) = seen.get(&symbol) {
                return Err(BindError::OverloadCollision {
                    symbol,
                    first: exports[index].function.signature.clone(),
                    second: function.signature,
                });
            }
            debug!(%symbol, path = %function.path, "assigned symbol");
            seen.insert(symbol.clone(), exports.len());
            exports.push(ExportedFunction { symbol, function });
        }
        Ok(exports)
    }
}
