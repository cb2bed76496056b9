//! Tolerant field location across namespace and nesting variants.
//!
//! Real-world NFS-e documents come with no namespace, a single global
//! namespace, or the field nested several levels under container tags. The
//! locator tries the cheap, common shapes first and only builds the
//! namespace-qualified path probes when those fail.

use tracing::{debug, trace};

use super::tree::{Element, QName};

/// Best-effort set of namespace URIs observed on a document's root.
///
/// This is sniffed from the root tag, not read from a schema: callers must
/// not assume it is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceSet {
    uris: Vec<String>,
}

impl NamespaceSet {
    /// Collect namespaces from the root's qualified tag, then from the
    /// `xmlns` declarations it carries.
    pub fn from_root(root: &Element) -> Self {
        let mut set = Self::default();

        if let Some(uri) = sniff_namespace(&root.tag()) {
            set.insert(uri);
        }
        for uri in root.declared_namespaces() {
            set.insert(uri);
        }

        set
    }

    fn insert(&mut self, uri: &str) {
        if !self.uris.iter().any(|known| known == uri) {
            self.uris.push(uri.to_string());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.uris.iter().map(String::as_str)
    }
}

/// Namespace prefix of a Clark-notation tag (`{uri}local`).
fn sniff_namespace(tag: &str) -> Option<&str> {
    let rest = tag.strip_prefix('{')?;
    let end = rest.find('}')?;
    Some(&rest[..end]).filter(|uri| !uri.is_empty())
}

/// A slash-separated element path relative to the root, e.g. `InfNfse/Numero`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    segments: Vec<String>,
}

impl ElementPath {
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Every segment qualified with `namespace` (or left bare).
    pub fn qualify(&self, namespace: Option<&str>) -> Vec<QName> {
        self.segments
            .iter()
            .map(|segment| QName::new(namespace, segment))
            .collect()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

/// A field to locate plus its path hypotheses, most specific first.
#[derive(Debug, Clone)]
pub struct FieldQuery {
    field: String,
    paths: Vec<ElementPath>,
}

impl FieldQuery {
    pub fn new(field: impl Into<String>, paths: &[&str]) -> Self {
        Self {
            field: field.into(),
            paths: paths.iter().map(|p| ElementPath::parse(p)).collect(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn paths(&self) -> &[ElementPath] {
        &self.paths
    }
}

/// One lookup attempt.
#[derive(Debug)]
enum Probe {
    /// Descendant-or-self search.
    Anywhere(QName),
    /// Exact child chain.
    Path(Vec<QName>),
    /// Immediate child.
    Child(QName),
}

impl Probe {
    fn resolve<'a>(&self, scope: &'a Element) -> Option<&'a Element> {
        match self {
            Probe::Anywhere(name) => scope.find(name),
            Probe::Path(path) => scope.find_path(path),
            Probe::Child(name) => scope.find_child(name),
        }
    }
}

/// Finds fields in one parsed document.
pub struct FieldLocator<'a> {
    root: &'a Element,
    namespaces: NamespaceSet,
}

impl<'a> FieldLocator<'a> {
    pub fn new(root: &'a Element) -> Self {
        Self {
            root,
            namespaces: NamespaceSet::from_root(root),
        }
    }

    /// Locate a field with non-empty text.
    ///
    /// Order: bare name anywhere, namespaced name anywhere, bare paths,
    /// namespaced paths. Elements whose text is blank count as absent.
    pub fn locate(&self, query: &FieldQuery) -> Option<&'a Element> {
        let probes = self
            .anywhere_probes(query.field())
            .chain(self.path_probes(query.paths()));
        self.first_with_text(self.root, query.field(), probes)
    }

    /// Like [`locate`](Self::locate), but only through the path hypotheses.
    pub fn locate_by_paths(&self, query: &FieldQuery) -> Option<&'a Element> {
        self.first_with_text(self.root, query.field(), self.path_probes(query.paths()))
    }

    /// Text of the located field.
    pub fn locate_text(&self, query: &FieldQuery) -> Option<&'a str> {
        self.locate(query).map(Element::text)
    }

    /// Find a grouping element by name, bare first, then per namespace.
    ///
    /// Containers hold children rather than text, so only existence counts.
    pub fn find_container(&self, name: &str) -> Option<&'a Element> {
        let found = self.anywhere_probes(name).find_map(|probe| {
            trace!("Probing container {:?}", probe);
            probe.resolve(self.root)
        });
        if let Some(container) = found {
            debug!("Found container {}", container.tag());
        }
        found
    }

    /// Locate `field` inside `container`: as a descendant (bare, then per
    /// namespace), then as an immediate child (bare, then per namespace).
    pub fn locate_within(&self, container: &'a Element, field: &str) -> Option<&'a Element> {
        let children = std::iter::once(Probe::Child(QName::local(field))).chain(
            self.namespaces
                .iter()
                .map(move |ns| Probe::Child(QName::qualified(ns, field))),
        );
        self.first_with_text(container, field, self.anywhere_probes(field).chain(children))
    }

    fn anywhere_probes<'s>(&'s self, field: &'s str) -> impl Iterator<Item = Probe> + 's {
        std::iter::once(Probe::Anywhere(QName::local(field))).chain(
            self.namespaces
                .iter()
                .map(move |ns| Probe::Anywhere(QName::qualified(ns, field))),
        )
    }

    fn path_probes<'s>(&'s self, paths: &'s [ElementPath]) -> impl Iterator<Item = Probe> + 's {
        let bare = paths.iter().map(|path| Probe::Path(path.qualify(None)));
        let qualified = paths.iter().flat_map(move |path| {
            self.namespaces
                .iter()
                .map(move |ns| Probe::Path(path.qualify(Some(ns))))
        });
        bare.chain(qualified)
    }

    fn first_with_text(
        &self,
        scope: &'a Element,
        field: &str,
        probes: impl Iterator<Item = Probe>,
    ) -> Option<&'a Element> {
        for probe in probes {
            trace!("Probing {} with {:?}", field, probe);
            match probe.resolve(scope) {
                Some(element) if element.has_text() => {
                    debug!("Located {} as {}", field, element.tag());
                    return Some(element);
                }
                Some(element) => {
                    trace!("Skipping {} with blank text", element.tag());
                }
                None => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_sniff_namespace() {
        assert_eq!(sniff_namespace("{urn:x}Nfse"), Some("urn:x"));
        assert_eq!(sniff_namespace("Nfse"), None);
        assert_eq!(sniff_namespace("{}Nfse"), None);
        assert_eq!(sniff_namespace("{broken"), None);
    }

    #[test]
    fn test_namespace_set_from_root() {
        let root = parse(r#"<a:Root xmlns:a="urn:a" xmlns:b="urn:b" xmlns="urn:a"/>"#);
        let set = NamespaceSet::from_root(&root);

        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["urn:a", "urn:b"]);
    }

    #[test]
    fn test_unqualified_match_wins_over_namespaced() {
        let root = parse(
            r#"<x:Root xmlns:x="urn:x">
                <x:Numero>namespaced</x:Numero>
                <Numero>bare</Numero>
            </x:Root>"#,
        );
        let locator = FieldLocator::new(&root);
        let query = FieldQuery::new("Numero", &[]);

        assert_eq!(locator.locate_text(&query), Some("bare"));
    }

    #[test]
    fn test_namespaced_search_when_bare_absent() {
        let root = parse(r#"<Root xmlns="urn:y"><Deep><Numero>9</Numero></Deep></Root>"#);
        let locator = FieldLocator::new(&root);

        assert_eq!(locator.locate_text(&FieldQuery::new("Numero", &[])), Some("9"));
    }

    #[test]
    fn test_blank_text_is_treated_as_absent() {
        // Documented quirk: a present-but-empty field falls through to the
        // next hypothesis and may end up "not found".
        let root = parse(r#"<Root><Numero>   </Numero><A><Numero/></A></Root>"#);
        let locator = FieldLocator::new(&root);

        assert_eq!(locator.locate(&FieldQuery::new("Numero", &["A/Numero"])), None);
    }

    #[test]
    fn test_blank_first_match_falls_through_to_paths() {
        let root = parse(
            r#"<q:Root xmlns:q="urn:q"><Numero/><q:A><q:Numero>12</q:Numero></q:A></q:Root>"#,
        );
        let locator = FieldLocator::new(&root);

        // The bare search hits the empty <Numero/> and moves on; the
        // namespaced search then finds the real value.
        assert_eq!(locator.locate_text(&FieldQuery::new("Numero", &["A/Numero"])), Some("12"));
    }

    #[test]
    fn test_locate_by_paths_ignores_anywhere_search() {
        let root = parse(r#"<Root><Other><Valor>1</Valor></Other><A><Valor>2</Valor></A></Root>"#);
        let locator = FieldLocator::new(&root);
        let query = FieldQuery::new("Valor", &["A/Valor"]);

        assert_eq!(locator.locate_by_paths(&query).map(Element::text), Some("2"));
        assert_eq!(locator.locate_text(&query), Some("1"));
    }

    #[test]
    fn test_namespaced_path_hypothesis() {
        let root = parse(r#"<n:Root xmlns:n="urn:n"><n:A><n:B>v</n:B></n:A></n:Root>"#);
        let locator = FieldLocator::new(&root);

        let query = FieldQuery::new("Missing", &["A/B"]);
        assert_eq!(locator.locate_by_paths(&query).map(Element::text), Some("v"));
    }

    #[test]
    fn test_container_then_field_within() {
        let root = parse(
            r#"<Root xmlns:v="urn:v">
                <Grupo><v:ValoresNfse><Nivel><v:BaseCalculo>10,5</v:BaseCalculo></Nivel></v:ValoresNfse></Grupo>
            </Root>"#,
        );
        let locator = FieldLocator::new(&root);

        let container = locator.find_container("ValoresNfse").unwrap();
        assert_eq!(container.tag(), "{urn:v}ValoresNfse");
        let value = locator.locate_within(container, "BaseCalculo").unwrap();
        assert_eq!(value.text(), "10,5");
    }

    #[test]
    fn test_container_without_text_still_found() {
        let root = parse(r#"<Root><Valores><X>1</X></Valores></Root>"#);
        let locator = FieldLocator::new(&root);

        assert!(locator.find_container("Valores").is_some());
        assert!(locator.find_container("ValoresNfse").is_none());
    }

    #[test]
    fn test_element_path_parse() {
        let path = ElementPath::parse("/InfNfse//Numero/");
        assert_eq!(path.segments(), ["InfNfse".to_string(), "Numero".to_string()]);
        assert_eq!(
            path.qualify(Some("urn:z")),
            vec![QName::qualified("urn:z", "InfNfse"), QName::qualified("urn:z", "Numero")]
        );
    }
}
