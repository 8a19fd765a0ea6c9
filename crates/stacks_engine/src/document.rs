use ego_tree::{NodeId, NodeRef, Tree};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("node is not attached to the document")]
    Detached,
    #[error("no element matches {0:?}")]
    NoMatch(String),
    #[error("fragment produced no nodes")]
    EmptyFragment,
}

/// Mutable host page: a parsed HTML tree the host and the agent both edit.
///
/// Node ids stay valid after removal, so callers must check [`contains`]
/// before trusting an id they kept from an earlier pass.
///
/// [`contains`]: PageDocument::contains
pub struct PageDocument {
    html: Html,
    location: String,
}

impl PageDocument {
    pub fn parse(html: &str, location: impl Into<String>) -> Self {
        Self {
            html: Html::parse_document(html),
            location: location.into(),
        }
    }

    /// URL the document was loaded from.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn to_html(&self) -> String {
        self.html.root_element().html()
    }

    /// Whether `id` is still reachable from the document root.
    pub fn contains(&self, id: NodeId) -> bool {
        let root = self.html.tree.root().id();
        match self.html.tree.get(id) {
            Some(node) => node.id() == root || node.ancestors().any(|a| a.id() == root),
            None => false,
        }
    }

    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        if !self.contains(id) {
            return None;
        }
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Attached elements matching `selector`, in document order.
    pub fn select_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.html
            .root_element()
            .select(selector)
            .map(|element| (*element).id())
            .collect()
    }

    pub fn select_first(&self, selector: &Selector) -> Option<NodeId> {
        self.html
            .root_element()
            .select(selector)
            .next()
            .map(|element| (*element).id())
    }

    pub fn count(&self, selector: &Selector) -> usize {
        self.html.root_element().select(selector).count()
    }

    /// Append parsed `fragment` as the last children of the first element
    /// matching `parent`.
    pub fn append_html(
        &mut self,
        parent: &Selector,
        fragment: &str,
    ) -> Result<Vec<NodeId>, DocumentError> {
        let parent_id = self
            .select_first(parent)
            .ok_or_else(|| DocumentError::NoMatch(format!("{parent:?}")))?;
        let source = Html::parse_fragment(fragment);
        let mut inserted = Vec::new();
        for child in source.root_element().children() {
            let new_id = self
                .html
                .tree
                .get_mut(parent_id)
                .ok_or(DocumentError::Detached)?
                .append(child.value().clone())
                .id();
            copy_children(child, &mut self.html.tree, new_id)?;
            inserted.push(new_id);
        }
        Ok(inserted)
    }

    /// Insert parsed `fragment` as the next siblings of `target`.
    pub fn insert_html_after(
        &mut self,
        target: NodeId,
        fragment: &str,
    ) -> Result<Vec<NodeId>, DocumentError> {
        self.ensure_has_parent(target)?;
        let source = Html::parse_fragment(fragment);
        let mut inserted = Vec::new();
        let mut anchor = target;
        for child in source.root_element().children() {
            let new_id = self
                .html
                .tree
                .get_mut(anchor)
                .ok_or(DocumentError::Detached)?
                .insert_after(child.value().clone())
                .id();
            copy_children(child, &mut self.html.tree, new_id)?;
            inserted.push(new_id);
            anchor = new_id;
        }
        if inserted.is_empty() {
            return Err(DocumentError::EmptyFragment);
        }
        Ok(inserted)
    }

    /// Swap `target` for the parsed `fragment`.
    pub fn replace_with_html(
        &mut self,
        target: NodeId,
        fragment: &str,
    ) -> Result<Vec<NodeId>, DocumentError> {
        let inserted = self.insert_html_after(target, fragment)?;
        self.remove(target)?;
        Ok(inserted)
    }

    pub fn remove(&mut self, target: NodeId) -> Result<(), DocumentError> {
        self.ensure_has_parent(target)?;
        self.html
            .tree
            .get_mut(target)
            .ok_or(DocumentError::Detached)?
            .detach();
        Ok(())
    }

    fn ensure_has_parent(&self, target: NodeId) -> Result<(), DocumentError> {
        let has_parent = self
            .html
            .tree
            .get(target)
            .and_then(|node| node.parent())
            .is_some();
        if has_parent && self.contains(target) {
            Ok(())
        } else {
            Err(DocumentError::Detached)
        }
    }
}

fn copy_children(
    source: NodeRef<'_, Node>,
    dest: &mut Tree<Node>,
    dest_parent: NodeId,
) -> Result<(), DocumentError> {
    for child in source.children() {
        let new_id = dest
            .get_mut(dest_parent)
            .ok_or(DocumentError::Detached)?
            .append(child.value().clone())
            .id();
        copy_children(child, dest, new_id)?;
    }
    Ok(())
}
