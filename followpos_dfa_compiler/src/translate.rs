//! Lowering of `regex-syntax` HIR into position syntax trees
//!
//! The position method only knows five node kinds, so every HIR construct is
//! expressed structurally: literals become leaf chains, character classes
//! become unions of per-character leaves, bounded repetitions are unrolled
//! into fresh copies of the operand (each copy gets its own positions), and
//! capture groups are transparent. Lookarounds cannot be expressed and are
//! rejected.

use regex_syntax::hir::{Class, Hir, HirKind, Literal, Repetition};

use crate::syntax::{NodeId, Symbol, SyntaxTree, TreeBuilder};
use crate::{BuildError, BuildResult};

/// Largest number of characters a single class may expand into
pub const MAX_CLASS_SIZE: usize = 512;

/// Largest repetition bound that will be unrolled
pub const MAX_REPEAT: u32 = 64;

/// Largest total number of leaf positions in a translated tree
pub const MAX_POSITIONS: usize = 4096;

/// Parse a textual pattern and translate it into a sealed syntax tree
pub fn parse(pattern: &str) -> BuildResult<SyntaxTree> {
    let hir = regex_syntax::Parser::new()
        .parse(pattern)
        .map_err(|err| BuildError::InvalidPattern(err.to_string()))?;
    translate(&hir)
}

/// Translate parsed HIR into a sealed syntax tree
///
/// Leaf symbols are single characters; simulate the result with a classifier
/// that maps each relevant character to itself.
pub fn translate(hir: &Hir) -> BuildResult<SyntaxTree> {
    let mut builder = TreeBuilder::new();
    let root = lower(hir, &mut builder)?;
    if builder.position_count() > MAX_POSITIONS {
        return Err(BuildError::TooComplex);
    }
    builder.seal(root)
}

fn lower(hir: &Hir, builder: &mut TreeBuilder) -> BuildResult<NodeId> {
    match hir.kind() {
        HirKind::Empty => Ok(builder.epsilon()),
        HirKind::Literal(literal) => lower_literal(literal, builder),
        HirKind::Class(class) => lower_class(class, builder),
        HirKind::Look(_) => Err(BuildError::UnsupportedFeature(
            "lookaround assertions".to_string(),
        )),
        HirKind::Repetition(repetition) => lower_repetition(repetition, builder),
        HirKind::Capture(capture) => lower(&capture.sub, builder),
        HirKind::Concat(parts) => {
            let mut node = None;
            for part in parts {
                let lowered = lower(part, builder)?;
                node = Some(match node {
                    None => lowered,
                    Some(previous) => builder.concat(previous, lowered),
                });
            }
            Ok(node.unwrap_or_else(|| builder.epsilon()))
        }
        HirKind::Alternation(parts) => {
            let mut node = None;
            for part in parts {
                let lowered = lower(part, builder)?;
                node = Some(match node {
                    None => lowered,
                    Some(previous) => builder.union(previous, lowered),
                });
            }
            Ok(node.unwrap_or_else(|| builder.epsilon()))
        }
    }
}

fn lower_literal(literal: &Literal, builder: &mut TreeBuilder) -> BuildResult<NodeId> {
    let chars: Vec<char> = match std::str::from_utf8(&literal.0) {
        Ok(s) => s.chars().collect(),
        Err(_) => literal.0.iter().map(|&byte| byte as char).collect(),
    };

    let mut node = None;
    for ch in chars {
        let leaf = builder.leaf(Symbol::from(ch));
        node = Some(match node {
            None => leaf,
            Some(previous) => builder.concat(previous, leaf),
        });
    }
    Ok(node.unwrap_or_else(|| builder.epsilon()))
}

fn lower_class(class: &Class, builder: &mut TreeBuilder) -> BuildResult<NodeId> {
    let chars = class_chars(class)?;
    let mut node = None;
    for ch in chars {
        let leaf = builder.leaf(Symbol::from(ch));
        node = Some(match node {
            None => leaf,
            Some(previous) => builder.union(previous, leaf),
        });
    }
    // regex-syntax never produces an empty class here, but an empty union
    // would be the empty language, not epsilon
    node.ok_or_else(|| BuildError::UnsupportedFeature("empty character class".to_string()))
}

fn class_chars(class: &Class) -> BuildResult<Vec<char>> {
    let mut chars = Vec::new();
    match class {
        Class::Unicode(class) => {
            let span: usize = class
                .iter()
                .map(|range| (range.end() as usize) - (range.start() as usize) + 1)
                .sum();
            if span > MAX_CLASS_SIZE {
                return Err(BuildError::UnsupportedFeature(format!(
                    "character class spans {} characters",
                    span
                )));
            }
            for range in class.iter() {
                for code in (range.start() as u32)..=(range.end() as u32) {
                    if let Some(ch) = char::from_u32(code) {
                        chars.push(ch);
                    }
                }
            }
        }
        Class::Bytes(class) => {
            let span: usize = class
                .iter()
                .map(|range| (range.end() as usize) - (range.start() as usize) + 1)
                .sum();
            if span > MAX_CLASS_SIZE {
                return Err(BuildError::UnsupportedFeature(format!(
                    "character class spans {} bytes",
                    span
                )));
            }
            for range in class.iter() {
                for byte in range.start()..=range.end() {
                    chars.push(byte as char);
                }
            }
        }
    }
    Ok(chars)
}

fn lower_repetition(repetition: &Repetition, builder: &mut TreeBuilder) -> BuildResult<NodeId> {
    let upper = repetition.max.unwrap_or(repetition.min);
    if repetition.min > MAX_REPEAT || upper > MAX_REPEAT {
        return Err(BuildError::TooComplex);
    }

    // each copy of the operand gets fresh positions
    let mut parts = Vec::new();
    for _ in 0..repetition.min {
        parts.push(lower(&repetition.sub, builder)?);
    }
    match repetition.max {
        None => {
            let body = lower(&repetition.sub, builder)?;
            parts.push(builder.star(body));
        }
        Some(max) => {
            for _ in repetition.min..max {
                let body = lower(&repetition.sub, builder)?;
                let epsilon = builder.epsilon();
                parts.push(builder.union(body, epsilon));
            }
        }
    }

    let mut node = None;
    for part in parts {
        node = Some(match node {
            None => part,
            Some(previous) => builder.concat(previous, part),
        });
    }
    Ok(node.unwrap_or_else(|| builder.epsilon()))
}
