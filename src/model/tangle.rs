//! Expansion of `<<name>>` placeholders.

use std::collections::HashSet;

use crate::errors::{SnarlError, Result};

use super::code_block::Fragment;
use super::reference_map::ReferenceMap;
use super::reference_name::ReferenceName;

/// Cycle detector for preventing infinite loops during expansion.
#[derive(Debug, Clone, Default)]
pub struct CycleDetector {
    /// Names currently being expanded, outermost first.
    stack: Vec<ReferenceName>,
    /// Set for O(1) membership checks.
    seen: HashSet<ReferenceName>,
}

impl CycleDetector {
    /// Creates a new cycle detector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a block, failing if it is already being expanded.
    pub fn enter(&mut self, name: &ReferenceName) -> Result<()> {
        if self.seen.contains(name) {
            let start = self.stack.iter().position(|n| n == name).unwrap_or(0);
            let mut cycle = self.stack[start..].to_vec();
            cycle.push(name.clone());
            return Err(SnarlError::CyclicReference(cycle));
        }
        self.seen.insert(name.clone());
        self.stack.push(name.clone());
        Ok(())
    }

    /// Exits the innermost block.
    pub fn exit(&mut self) {
        if let Some(name) = self.stack.pop() {
            self.seen.remove(&name);
        }
    }

    /// Returns the current depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Expands a block into its lines.
///
/// Placeholders are replaced by the expansion of the referenced block, every
/// line of which is prefixed with the placeholder's indentation. The block's
/// replacement rules then run once over the complete expanded text.
pub fn expand(
    refs: &ReferenceMap,
    name: &ReferenceName,
    detector: &mut CycleDetector,
) -> Result<Vec<String>> {
    let block = refs
        .lookup(name)
        .ok_or_else(|| SnarlError::BlockNotFound(name.clone()))?;
    let options = block.options();

    detector.enter(name)?;

    let mut lines = Vec::new();
    for piece in &block.pieces {
        let verbatim = options.verbatim || piece.inherited.verbatim;

        for fragment in &piece.fragments {
            match fragment {
                Fragment::Text(text) => lines.push(text.clone()),
                Fragment::Reference { .. } if verbatim => lines.push(fragment.render()),
                Fragment::Reference {
                    indent,
                    name: target,
                    location,
                } => {
                    if !refs.contains_name(target) {
                        return Err(SnarlError::UndefinedReference {
                            name: target.clone(),
                            referrer: name.clone(),
                            location: location.clone(),
                        });
                    }
                    tracing::trace!("expanding <<{}>> into {}", target, name);
                    for line in expand(refs, target, detector)? {
                        lines.push(format!("{}{}", indent, line));
                    }
                }
            }
        }
    }

    detector.exit();

    if options.replace.is_empty() || lines.is_empty() {
        return Ok(lines);
    }
    let replaced = options.apply_replacements(lines.join("\n"));
    Ok(replaced.split('\n').map(str::to_string).collect())
}

/// Expands a block into file content: lines joined with `\n` and terminated
/// by a final newline unless empty.
pub fn tangle_ref(refs: &ReferenceMap, name: &ReferenceName) -> Result<String> {
    let mut detector = CycleDetector::new();
    let lines = expand(refs, name, &mut detector)?;

    if lines.is_empty() {
        return Ok(String::new());
    }
    let mut output = lines.join("\n");
    output.push('\n');
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockOptions, Replacement};
    use crate::test_utils::{make_append, make_block};
    use pretty_assertions::assert_eq;

    fn tangle(refs: &ReferenceMap, name: &str) -> Result<String> {
        tangle_ref(refs, &ReferenceName::new(name))
    }

    #[test]
    fn test_tangle_simple() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "print('hello')\nprint('world')")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "print('hello')\nprint('world')\n");
    }

    #[test]
    fn test_tangle_with_reference() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "def main():\n    <<body>>")).unwrap();
        refs.define(make_block("body", "print('hello')")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "def main():\n    print('hello')\n");
    }

    #[test]
    fn test_forward_reference() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("body", "x = 1")).unwrap();
        refs.define(make_block("main", "<<body>>")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "x = 1\n");
    }

    #[test]
    fn test_indentation_applies_to_every_line() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "{\n    <<body>>\n}")).unwrap();
        refs.define(make_block("body", "a();\n\nb();")).unwrap();

        assert_eq!(
            tangle(&refs, "main").unwrap(),
            "{\n    a();\n    \n    b();\n}\n"
        );
    }

    #[test]
    fn test_nested_indentation_composes() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "if True:\n    <<inner>>")).unwrap();
        refs.define(make_block("inner", "if True:\n    <<deepest>>")).unwrap();
        refs.define(make_block("deepest", "print('deep')\nprint('er')")).unwrap();

        assert_eq!(
            tangle(&refs, "main").unwrap(),
            "if True:\n    if True:\n        print('deep')\n        print('er')\n"
        );
    }

    #[test]
    fn test_tab_indentation() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "\t<<body>>")).unwrap();
        refs.define(make_block("body", "a\nb")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "\ta\n\tb\n");
    }

    #[test]
    fn test_multiple_references_duplicate_content() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "<<x>>\n  <<x>>")).unwrap();
        refs.define(make_block("x", "X")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "X\n  X\n");
    }

    #[test]
    fn test_append_equals_concatenation() {
        let mut appended = ReferenceMap::new();
        appended.define(make_block("main", "line1\n<<x>>")).unwrap();
        appended.define(make_block("x", "X")).unwrap();
        appended.define(make_append("main", "line2")).unwrap();

        let mut single = ReferenceMap::new();
        single.define(make_block("main", "line1\n<<x>>\nline2")).unwrap();
        single.define(make_block("x", "X")).unwrap();

        assert_eq!(tangle(&appended, "main").unwrap(), tangle(&single, "main").unwrap());
    }

    #[test]
    fn test_self_reference() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("a", "before\n<<a>>")).unwrap();

        let result = tangle(&refs, "a");
        match result {
            Err(SnarlError::CyclicReference(cycle)) => {
                let names: Vec<_> = cycle.iter().map(|n| n.as_str()).collect();
                assert_eq!(names, vec!["a", "a"]);
            }
            other => panic!("Expected CyclicReference, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_detection() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "<<a>>")).unwrap();
        refs.define(make_block("a", "<<b>>")).unwrap();
        refs.define(make_block("b", "<<c>>")).unwrap();
        refs.define(make_block("c", "<<a>>")).unwrap();

        match tangle(&refs, "main") {
            Err(SnarlError::CyclicReference(cycle)) => {
                let names: Vec<_> = cycle.iter().map(|n| n.as_str()).collect();
                assert_eq!(names, vec!["a", "b", "c", "a"]);
            }
            other => panic!("Expected CyclicReference, got {:?}", other),
        }
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "<<left>>\n<<right>>")).unwrap();
        refs.define(make_block("left", "<<shared>>")).unwrap();
        refs.define(make_block("right", "<<shared>>")).unwrap();
        refs.define(make_block("shared", "s")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "s\ns\n");
    }

    #[test]
    fn test_undefined_reference() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "<<missing>>")).unwrap();

        match tangle(&refs, "main") {
            Err(SnarlError::UndefinedReference { name, referrer, .. }) => {
                assert_eq!(name.as_str(), "missing");
                assert_eq!(referrer.as_str(), "main");
            }
            other => panic!("Expected UndefinedReference, got {:?}", other),
        }
    }

    #[test]
    fn test_block_not_found() {
        let refs = ReferenceMap::new();
        assert!(matches!(tangle(&refs, "nonexistent"), Err(SnarlError::BlockNotFound(_))));
    }

    #[test]
    fn test_verbatim_block_keeps_placeholders() {
        let mut refs = ReferenceMap::new();
        let options = BlockOptions {
            verbatim: true,
            ..Default::default()
        };
        refs.define(make_block("main", "  <<undefined>>").with_options(options))
            .unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "  <<undefined>>\n");
    }

    #[test]
    fn test_verbatim_inherited_from_include() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "<<a>>")).unwrap();
        let mut piece = make_append("main", "<<a>>");
        piece.inherited.verbatim = true;
        refs.define(piece).unwrap();
        refs.define(make_block("a", "A")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "A\n<<a>>\n");
    }

    #[test]
    fn test_replace_on_expanded_text() {
        let mut refs = ReferenceMap::new();
        let options = BlockOptions {
            replace: vec![Replacement::new("gadgets", "gizmos").unwrap()],
            ..Default::default()
        };
        refs.define(make_block("main", "gadgets\n<<inner>>").with_options(options))
            .unwrap();
        refs.define(make_block("inner", "more gadgets and gadgets")).unwrap();

        assert_eq!(
            tangle(&refs, "main").unwrap(),
            "gizmos\nmore gizmos and gizmos\n"
        );
    }

    #[test]
    fn test_replace_spanning_fragments() {
        let mut refs = ReferenceMap::new();
        let options = BlockOptions {
            replace: vec![Replacement::new("a\nb", "joined").unwrap()],
            ..Default::default()
        };
        refs.define(make_block("main", "a\n<<b>>").with_options(options))
            .unwrap();
        refs.define(make_block("b", "b")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "joined\n");
    }

    #[test]
    fn test_nested_replace_runs_before_indentation() {
        let mut refs = ReferenceMap::new();
        let options = BlockOptions {
            replace: vec![Replacement::new("^", "// ").unwrap()],
            ..Default::default()
        };
        refs.define(make_block("main", "    <<inner>>")).unwrap();
        refs.define(make_block("inner", "x").with_options(options)).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "    // x\n");
    }

    #[test]
    fn test_empty_block() {
        let mut refs = ReferenceMap::new();
        refs.define(make_block("main", "a\n  <<empty>>\nb")).unwrap();
        refs.define(make_block("empty", "")).unwrap();

        assert_eq!(tangle(&refs, "main").unwrap(), "a\nb\n");
    }

    #[test]
    fn test_cycle_detector() {
        let mut detector = CycleDetector::new();

        detector.enter(&ReferenceName::new("a")).unwrap();
        detector.enter(&ReferenceName::new("b")).unwrap();
        detector.enter(&ReferenceName::new("c")).unwrap();
        assert_eq!(detector.depth(), 3);

        assert!(detector.enter(&ReferenceName::new("a")).is_err());

        detector.exit();
        detector.exit();
        detector.exit();
        assert_eq!(detector.depth(), 0);
    }
}
