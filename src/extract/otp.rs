//! OTP pattern detection
//!
//! A module follows an OTP pattern when it `use`s the pattern's module or
//! declares it as a behaviour. Callback implementations are the module's
//! functions matching the behaviour's callback names and arities.

use super::records::{FunctionKey, ModuleAnalysis, OtpKind, OtpPatternRecord};
use crate::scope::{DirectiveKind, Scope};
use indexmap::IndexMap;

pub(crate) fn detect_patterns(analysis: &ModuleAnalysis) -> Vec<OtpPatternRecord> {
    let mut found: IndexMap<OtpKind, OtpPatternRecord> = IndexMap::new();

    for directive in analysis
        .directives
        .iter()
        .filter(|d| d.scope == Scope::Module)
    {
        let DirectiveKind::Use { options } = &directive.kind else {
            continue;
        };
        if let Some(kind) = OtpKind::from_module(&directive.source.to_string()) {
            found
                .entry(kind)
                .or_insert_with(|| pattern(kind, analysis))
                .use_options
                .extend(options.iter().cloned());
        }
    }

    for behaviour in &analysis.behaviours {
        if let Some(kind) = OtpKind::from_module(&behaviour.to_string()) {
            found.entry(kind).or_insert_with(|| pattern(kind, analysis));
        }
    }

    found.into_values().collect()
}

fn pattern(kind: OtpKind, analysis: &ModuleAnalysis) -> OtpPatternRecord {
    let callbacks = kind
        .callbacks()
        .iter()
        .filter(|(name, arity)| analysis.defines(name, *arity))
        .map(|(name, arity)| FunctionKey::new(*name, *arity))
        .collect();
    OtpPatternRecord {
        kind,
        use_options: Vec::new(),
        callbacks,
    }
}
