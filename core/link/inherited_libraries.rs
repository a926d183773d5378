use crate::model::Label;
use fxhash::FxHashMap;

/// An ordered set of libraries reachable from a target, each flagged with whether the target can
/// name it directly.
///
/// The flag only ever goes from `false` to `true`: if any path to a library grants direct access,
/// the library is directly accessible.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritedLibraries {
    libs: Vec<(Label, bool)>,
    index: FxHashMap<Label, usize>,
}

impl InheritedLibraries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, label: Label, has_direct_access: bool) {
        match self.index.get(&label) {
            Some(&idx) => self.libs[idx].1 |= has_direct_access,
            None => {
                self.index.insert(label.clone(), self.libs.len());
                self.libs.push((label, has_direct_access));
            }
        }
    }

    /// Appends every library of `other`. Access is kept only where both `other` grants it and the
    /// edge leading to `other` is public.
    pub fn append_inherited(&mut self, other: &InheritedLibraries, is_public: bool) {
        for (label, has_direct_access) in &other.libs {
            self.append(label.clone(), *has_direct_access && is_public);
        }
    }

    pub fn ordered_and_public_flag(&self) -> &[(Label, bool)] {
        &self.libs
    }

    pub fn ordered(&self) -> impl Iterator<Item = &Label> {
        self.libs.iter().map(|(l, _)| l)
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.index.contains_key(label)
    }

    pub fn has_direct_access(&self, label: &Label) -> Option<bool> {
        self.index.get(label).map(|&idx| self.libs[idx].1)
    }

    pub fn len(&self) -> usize {
        self.libs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> Label {
        s.parse().unwrap()
    }

    #[test]
    fn appending_twice_keeps_the_first_position_and_ors_the_flag() {
        let mut libs = InheritedLibraries::new();
        libs.append(label("//a:a"), false);
        libs.append(label("//b:b"), true);
        libs.append(label("//a:a"), true);

        assert_eq!(
            libs.ordered_and_public_flag(),
            &[(label("//a:a"), true), (label("//b:b"), true)]
        );
    }

    #[test]
    fn a_private_edge_hides_inherited_libraries() {
        let mut dep = InheritedLibraries::new();
        dep.append(label("//d:d"), true);

        let mut libs = InheritedLibraries::new();
        libs.append_inherited(&dep, false);
        assert_eq!(libs.has_direct_access(&label("//d:d")), Some(false));

        libs.append_inherited(&dep, true);
        assert_eq!(libs.has_direct_access(&label("//d:d")), Some(true));
    }

    #[quickcheck]
    fn every_label_appears_once(labels: Vec<(Label, bool)>) {
        let mut libs = InheritedLibraries::new();
        for (l, p) in &labels {
            libs.append(l.clone(), *p);
        }

        let mut seen = fxhash::FxHashSet::default();
        for l in libs.ordered() {
            assert!(seen.insert(l.clone()));
        }
        for (l, p) in labels {
            assert!(libs.contains(&l));
            if p {
                assert_eq!(libs.has_direct_access(&l), Some(true));
            }
        }
    }
}
