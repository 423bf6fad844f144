//! The extend registry: a single mapping built while walking the AST and
//! consulted exactly once, after every rule's selector has been combined
//! and every declaration emitted, to avoid mutating already-emitted text
//! per rule (spec.md §9 "Extend registry").

pub struct ExtendEntry {
    pub target: String,
    pub extending: String,
    pub all: bool,
}

pub struct ExtendRegistry {
    entries: Vec<ExtendEntry>,
}

impl ExtendRegistry {
    pub fn new() -> ExtendRegistry {
        ExtendRegistry { entries: Vec::new() }
    }

    pub fn register(&mut self, target: String, extending: String, all: bool) {
        self.entries.push(ExtendEntry { target, extending, all });
    }

    /// Rewrites each emitted rule's selector list in place. `all` extends
    /// attach wherever the target text appears in any emitted selector;
    /// plain extends attach only to the first rule whose selector equals
    /// the target exactly (spec.md §4.4 "extend"). Callers pass one
    /// `&mut Vec<String>` per emitted rule; the evaluator's output tree
    /// isn't a contiguous slice, so this takes any order-preserving
    /// collection of mutable references instead.
    pub fn apply(&self, mut emitted: Vec<&mut Vec<String>>) {
        for entry in &self.entries {
            let mut matched_once = false;
            for selectors in emitted.iter_mut() {
                let matches = if entry.all {
                    selectors.iter().any(|s| s.contains(&entry.target))
                } else {
                    !matched_once && selectors.iter().any(|s| *s == entry.target)
                };
                if matches {
                    if !selectors.contains(&entry.extending) {
                        selectors.push(entry.extending.clone());
                    }
                    matched_once = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_extend_attaches_once() {
        let mut registry = ExtendRegistry::new();
        registry.register(".error".to_string(), ".validation".to_string(), false);
        let mut a = vec![".error".to_string()];
        let mut b = vec![".error".to_string()];
        registry.apply(vec![&mut a, &mut b]);
        assert_eq!(a, vec![".error".to_string(), ".validation".to_string()]);
        assert_eq!(b, vec![".error".to_string()]);
    }

    #[test]
    fn extend_all_attaches_everywhere() {
        let mut registry = ExtendRegistry::new();
        registry.register(".error".to_string(), ".validation".to_string(), true);
        let mut a = vec![".error".to_string()];
        let mut b = vec![".form .error".to_string()];
        registry.apply(vec![&mut a, &mut b]);
        assert!(a.contains(&".validation".to_string()));
        assert!(b.contains(&".validation".to_string()));
    }
}
