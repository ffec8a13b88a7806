#![forbid(unsafe_code)]

//! The selector subset used to resolve template regions.
//!
//! Supported: type selectors (`p`), universal (`*`), classes (`.a.b`),
//! ids (`#x`), attribute presence (`[data-modal]`), and the descendant
//! combinator (whitespace). That covers every structural lookup the modal
//! engine performs (`.modal-title p`, `.modal-content`, `#modalBackground
//! .modal`) without pulling in a CSS engine.

/// One compound selector (no combinators).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    /// Required tag name, lowercased. `None` matches any element.
    pub tag: Option<String>,
    /// Required `id`.
    pub id: Option<String>,
    /// Required classes.
    pub classes: Vec<String>,
    /// Required attribute names.
    pub attributes: Vec<String>,
}

impl Compound {
    fn parse(input: &str) -> Option<Self> {
        let mut compound = Self::default();
        let mut rest = input;

        let tag_end = rest
            .find(['.', '#', '['])
            .unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() && tag != "*" {
            if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return None;
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            rest = &rest[marker.len_utf8()..];
            if marker == '[' {
                let end = rest.find(']')?;
                let name = rest[..end].trim();
                if name.is_empty() {
                    return None;
                }
                compound.attributes.push(name.to_ascii_lowercase());
                rest = &rest[end + 1..];
                continue;
            }
            let end = rest.find(['.', '#', '[']).unwrap_or(rest.len());
            let name = &rest[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '.' => compound.classes.push(name.to_owned()),
                '#' => compound.id = Some(name.to_owned()),
                _ => return None,
            }
            rest = &rest[end..];
        }

        Some(compound)
    }

    /// Test this compound against one element.
    ///
    /// `attribute` reads an attribute of the element under test.
    pub fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        if let Some(required) = &self.tag
            && !required.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && attribute("id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.is_empty() {
            let list = attribute("class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|class| list.split_whitespace().any(|c| c == class))
            {
                return false;
            }
        }
        self.attributes.iter().all(|name| attribute(name).is_some())
    }
}

/// A parsed selector: compounds joined by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector. Returns `None` for empty or unsupported syntax.
    ///
    /// ```
    /// use veil_dom::Selector;
    ///
    /// assert!(Selector::parse(".modal-title p").is_some());
    /// assert!(Selector::parse("div > p").is_none());
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let compounds = input
            .split_whitespace()
            .map(Compound::parse)
            .collect::<Option<Vec<_>>>()?;
        if compounds.is_empty() {
            return None;
        }
        Some(Self { compounds })
    }

    /// Compounds from outermost ancestor to subject.
    #[must_use]
    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// Match against an element and its ancestor chain.
    ///
    /// `chain` yields `(tag, attribute-reader)` pairs starting with the
    /// subject element and walking outwards. Descendant combinators are
    /// matched greedily, which is exact for this combinator set.
    pub fn matches_chain<'a, I, F>(&self, mut chain: I) -> bool
    where
        I: Iterator<Item = (&'a str, F)>,
        F: Fn(&str) -> Option<&'a str>,
    {
        let mut remaining = self.compounds.iter().rev();
        let Some(subject) = remaining.next() else {
            return false;
        };
        let Some((tag, attribute)) = chain.next() else {
            return false;
        };
        if !subject.matches(tag, attribute) {
            return false;
        }
        'outer: for compound in remaining {
            for (tag, attribute) in chain.by_ref() {
                if compound.matches(tag, attribute) {
                    continue 'outer;
                }
            }
            return false;
        }
        true
    }
}
