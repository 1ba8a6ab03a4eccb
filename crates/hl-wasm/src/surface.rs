//! DOM implementation of `EditableSurface`.

use hl_core::EditableSurface;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventInit, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Node};

/// An editable element on the page.
#[derive(Debug, Clone)]
pub enum DomSurface {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
    /// `contenteditable` element
    Editable(HtmlElement),
}

impl DomSurface {
    /// Wrap `node` if it is something a user can type into.
    pub fn from_node(node: Node) -> Option<Self> {
        let node = match node.dyn_into::<HtmlInputElement>() {
            Ok(input) => return is_text_input(&input).then_some(Self::Input(input)),
            Err(node) => node,
        };
        let node = match node.dyn_into::<HtmlTextAreaElement>() {
            Ok(area) => return Some(Self::TextArea(area)),
            Err(node) => node,
        };
        match node.dyn_into::<HtmlElement>() {
            Ok(el) if el.is_content_editable() => Some(Self::Editable(el)),
            _ => None,
        }
    }

    pub fn element(&self) -> &Element {
        match self {
            Self::Input(el) => el.as_ref(),
            Self::TextArea(el) => el.as_ref(),
            Self::Editable(el) => el.as_ref(),
        }
    }

    /// Whether the element is still in the document.
    pub fn is_connected(&self) -> bool {
        self.element().is_connected()
    }

    fn dispatch(&self, kind: &str) {
        let init = EventInit::new();
        init.set_bubbles(true);
        match Event::new_with_event_init_dict(kind, &init) {
            Ok(event) => {
                if let Err(e) = self.element().dispatch_event(&event) {
                    log::debug!("Failed to dispatch synthetic {} event: {:?}", kind, e);
                }
            }
            Err(e) => log::debug!("Failed to create synthetic {} event: {:?}", kind, e),
        }
    }
}

/// Joins the text nodes of a contenteditable. Whitespace to the tokenizer, so
/// words never run together across element boundaries.
const NODE_SEPARATOR: &str = "\u{2029}";

/// Descendant text nodes of `root` in document order.
fn text_nodes(root: &Node) -> Vec<Node> {
    let mut nodes = Vec::new();
    collect_text_nodes(root, &mut nodes);
    nodes
}

fn collect_text_nodes(node: &Node, out: &mut Vec<Node>) {
    let mut child = node.first_child();
    while let Some(current) = child {
        if current.node_type() == Node::TEXT_NODE {
            out.push(current.clone());
        } else {
            collect_text_nodes(&current, out);
        }
        child = current.next_sibling();
    }
}

#[inline]
fn utf16_len(node: &Node) -> usize {
    node.node_value().map_or(0, |v| v.encode_utf16().count())
}

fn is_text_input(input: &HtmlInputElement) -> bool {
    matches!(
        input.type_().to_ascii_lowercase().as_str(),
        "" | "text" | "search" | "email" | "url" | "tel"
    )
}

impl EditableSurface for DomSurface {
    fn text(&self) -> String {
        match self {
            Self::Input(el) => el.value(),
            Self::TextArea(el) => el.value(),
            Self::Editable(el) => text_nodes(el)
                .iter()
                .map(|node| node.node_value().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(NODE_SEPARATOR),
        }
    }

    fn set_text(&mut self, text: &str) -> bool {
        match self {
            Self::Input(el) => el.set_value(text),
            Self::TextArea(el) => el.set_value(text),
            Self::Editable(el) => {
                // Write each text node in place; markup is never touched.
                let nodes = text_nodes(el);
                let parts: Vec<&str> = text.split(NODE_SEPARATOR).collect();
                if nodes.is_empty() {
                    return text.is_empty();
                }
                if parts.len() != nodes.len() {
                    return false;
                }
                for (node, part) in nodes.iter().zip(parts) {
                    if node.node_value().as_deref() != Some(part) {
                        node.set_node_value(Some(part));
                    }
                }
            }
        }
        true
    }

    fn caret(&self) -> Option<usize> {
        match self {
            // Some input types throw on selection access.
            Self::Input(el) => el.selection_start().ok().flatten().map(|c| c as usize),
            Self::TextArea(el) => el.selection_start().ok().flatten().map(|c| c as usize),
            Self::Editable(el) => {
                let selection = web_sys::window()?.get_selection().ok().flatten()?;
                let anchor = selection.anchor_node()?;
                let mut offset = 0;
                for node in text_nodes(el) {
                    if node == anchor {
                        return Some(offset + selection.anchor_offset() as usize);
                    }
                    offset += utf16_len(&node) + 1;
                }
                None
            }
        }
    }

    fn set_caret(&mut self, caret: usize) {
        let result = match self {
            Self::Input(el) => el.set_selection_range(caret as u32, caret as u32),
            Self::TextArea(el) => el.set_selection_range(caret as u32, caret as u32),
            Self::Editable(el) => {
                let Some(selection) = web_sys::window().and_then(|w| w.get_selection().ok().flatten()) else {
                    return;
                };
                let nodes = text_nodes(el);
                let mut remaining = caret;
                let mut target = None;
                for node in &nodes {
                    let len = utf16_len(node);
                    if remaining <= len {
                        target = Some((node, remaining));
                        break;
                    }
                    remaining -= len + 1;
                }
                let target = target.or_else(|| nodes.last().map(|node| (node, utf16_len(node))));
                match target {
                    Some((node, offset)) => selection.collapse_with_offset(Some(node), offset as u32),
                    None => return,
                }
            }
        };
        if let Err(e) = result {
            log::debug!("Failed to restore caret: {:?}", e);
        }
    }

    fn notify_changed(&mut self) {
        self.dispatch("input");
        self.dispatch("change");
    }

    fn is_same_surface(&self, other: &Self) -> bool {
        self.element() == other.element()
    }
}
