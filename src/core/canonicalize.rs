//! Parameter canonicalization.
//!
//! Rewrites every reference to a declared parameter into a positional
//! placeholder (`#p0`, `#p1`, ...) so that two functions differing only in
//! parameter names compare as identical. Runs once per function, before
//! scope collection; it is the only pass that mutates the tree.

use crate::core::tree::{FunctionUnit, NodeKind};

/// Placeholder spelling for the parameter at `ordinal`.
fn placeholder(ordinal: usize) -> String {
    format!("#p{ordinal}")
}

/// True for the conventional receiver: a parameter named `self` in the
/// leading position. Its identity is structural, not nominal, so it is
/// kept as written.
fn is_receiver(name: &str, ordinal: usize) -> bool {
    name == "self" && ordinal == 0
}

fn substitute(unit: &FunctionUnit, name: &str) -> Option<String> {
    let ordinal = *unit.params.get(name)?;
    if is_receiver(name, ordinal) {
        return None;
    }
    Some(placeholder(ordinal))
}

/// Rewrite parameter references to positional placeholders, in place.
///
/// Applies to identifier references, attribute-access owners, and
/// call-target owners. Every node lives in the arena exactly once, so a
/// linear scan covers the full tree. Idempotent: placeholders are not
/// valid parameter names, so a second run changes nothing.
pub fn canonicalize_parameters(unit: &mut FunctionUnit) {
    for id in unit.node_ids().collect::<Vec<_>>() {
        let (kind, identifier, owner) = {
            let node = unit.node(id);
            (node.kind, node.identifier.clone(), node.owner.clone())
        };

        if kind == NodeKind::Ident {
            if let Some(replacement) = substitute(unit, &identifier) {
                unit.node_mut(id).identifier = replacement;
            }
        }

        if matches!(kind, NodeKind::Attribute | NodeKind::Call) {
            if let Some(owner_name) = owner {
                if let Some(replacement) = substitute(unit, &owner_name) {
                    unit.node_mut(id).owner = Some(replacement);
                }
            }
        }
    }
}
