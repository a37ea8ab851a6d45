//! Scripted in-memory DOM standing in for a live browser session in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::{ActivationStrategy, Browser, Css};
use crate::error::BrowserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickBehavior {
    Normal,
    /// Native click intercepted, forced click goes through.
    Intercepted,
    /// Both native and forced clicks are intercepted.
    Blocked,
    /// Element went stale; every click errors.
    Stale,
}

#[derive(Debug, Clone)]
pub struct FakeNode {
    tag: String,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    text: String,
    children: Vec<NodeId>,
    click: ClickBehavior,
    scroll_fails: bool,
    effect: Option<Effect>,
}

/// What activating a control does to the page.
#[derive(Debug, Clone)]
enum Effect {
    /// Set an attribute on an existing node.
    SetAttr(NodeId, String, String),
    /// Re-render: drop the children of a node and give it a fresh one.
    Replace(NodeId, Box<FakeNode>),
}

impl FakeNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: HashMap::new(),
            text: String::new(),
            children: Vec::new(),
            click: ClickBehavior::Normal,
            scroll_fails: false,
            effect: None,
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn on_click(mut self, behavior: ClickBehavior) -> Self {
        self.click = behavior;
        self
    }

    pub fn unscrollable(mut self) -> Self {
        self.scroll_fails = true;
        self
    }

    fn matches(&self, selector: &Css) -> bool {
        match selector.as_str().strip_prefix('.') {
            Some(class) => self.classes.iter().any(|c| c == class),
            None => self.tag == selector.as_str(),
        }
    }
}

#[derive(Default)]
struct Dom {
    nodes: Vec<FakeNode>,
    roots: Vec<NodeId>,
    activations: Vec<(NodeId, ActivationStrategy)>,
    scrolled: Vec<NodeId>,
    visited: Vec<String>,
    closes: usize,
}

impl Dom {
    fn node(&self, id: NodeId) -> &FakeNode {
        &self.nodes[id.0]
    }

    fn push(&mut self, node: FakeNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn descendants(&self, id: NodeId, selector: &Css, out: &mut Vec<NodeId>) {
        for &child in &self.node(id).children {
            if self.node(child).matches(selector) {
                out.push(child);
            }
            self.descendants(child, selector, out);
        }
    }

    fn activate(&mut self, id: NodeId, strategy: ActivationStrategy) {
        self.activations.push((id, strategy));
        match self.node(id).effect.clone() {
            Some(Effect::SetAttr(target, attr, value)) => {
                self.nodes[target.0].attrs.insert(attr, value);
            }
            Some(Effect::Replace(parent, node)) => {
                let fresh = self.push(*node);
                self.nodes[parent.0].children = vec![fresh];
            }
            None => {}
        }
    }
}

/// Markup description of one product tile in the default listing layout.
#[derive(Debug, Clone, Default)]
pub struct TileSpec {
    pub name: Option<String>,
    pub image_src: Option<String>,
    pub image_data_src: Option<String>,
    pub swatches: Vec<SwatchSpec>,
    pub detail: Option<String>,
    pub pricing: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SwatchSpec {
    pub click: ClickBehavior,
    /// Image `src` the tile shows once this swatch is active.
    pub image_src: String,
}

impl SwatchSpec {
    pub fn new(click: ClickBehavior, image_src: &str) -> Self {
        Self {
            click,
            image_src: image_src.to_string(),
        }
    }
}

pub struct FakePage {
    dom: Mutex<Dom>,
    url: String,
}

impl FakePage {
    pub fn new() -> Self {
        Self::at("https://shop.test/listing")
    }

    pub fn at(url: &str) -> Self {
        Self {
            dom: Mutex::new(Dom::default()),
            url: url.to_string(),
        }
    }

    pub fn add_root(&self, node: FakeNode) -> NodeId {
        let mut dom = self.dom.lock().unwrap();
        let id = dom.push(node);
        dom.roots.push(id);
        id
    }

    pub fn add_child(&self, parent: NodeId, node: FakeNode) -> NodeId {
        let mut dom = self.dom.lock().unwrap();
        let id = dom.push(node);
        dom.nodes[parent.0].children.push(id);
        id
    }

    /// Activating `control` sets `attr` on `target`.
    pub fn on_activate(&self, control: NodeId, target: NodeId, attr: &str, value: &str) {
        let mut dom = self.dom.lock().unwrap();
        dom.nodes[control.0].effect = Some(Effect::SetAttr(
            target,
            attr.to_string(),
            value.to_string(),
        ));
    }

    /// Activating `control` replaces every child of `parent` with a new `node`.
    pub fn on_activate_rerender(&self, control: NodeId, parent: NodeId, node: FakeNode) {
        let mut dom = self.dom.lock().unwrap();
        dom.nodes[control.0].effect = Some(Effect::Replace(parent, Box::new(node)));
    }

    pub fn visited(&self) -> Vec<String> {
        self.dom.lock().unwrap().visited.clone()
    }

    pub fn closes(&self) -> usize {
        self.dom.lock().unwrap().closes
    }

    pub fn activations(&self) -> Vec<(NodeId, ActivationStrategy)> {
        self.dom.lock().unwrap().activations.clone()
    }

    pub fn scrolled(&self) -> Vec<NodeId> {
        self.dom.lock().unwrap().scrolled.clone()
    }

    /// Builds a product tile with the default class names.
    pub fn add_tile(&self, spec: TileSpec) -> NodeId {
        let tile = self.add_root(FakeNode::new("div").class("product-tile"));

        if let Some(name) = &spec.name {
            self.add_child(tile, FakeNode::new("h3").class("product-name").text(name));
        }

        let wrapper = self.add_child(tile, FakeNode::new("div").class("img-wrapper"));
        let mut image = FakeNode::new("img");
        if let Some(src) = &spec.image_src {
            image = image.attr("src", src);
        }
        if let Some(data_src) = &spec.image_data_src {
            image = image.attr("data-src", data_src);
        }
        let image = self.add_child(wrapper, image);

        if !spec.swatches.is_empty() {
            let list = self.add_child(tile, FakeNode::new("ul").class("cover-swatch-list"));
            for swatch in &spec.swatches {
                let button = self.add_child(list, FakeNode::new("button").on_click(swatch.click));
                self.on_activate(button, image, "src", &swatch.image_src);
            }
        }

        if let Some(pricing) = &spec.pricing {
            self.add_child(tile, FakeNode::new("div").class("item-pricing").text(pricing));
        }
        if let Some(detail) = &spec.detail {
            self.add_child(tile, FakeNode::new("div").class("item-detail").text(detail));
        }

        tile
    }
}

fn stale() -> BrowserError {
    BrowserError::Command("stale element reference".to_string())
}

#[async_trait]
impl Browser for FakePage {
    type Element = NodeId;

    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.dom.lock().unwrap().visited.push(url.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.dom.lock().unwrap().closes += 1;
        Ok(())
    }

    async fn wait_for_all(
        &self,
        selector: &Css,
        timeout: Duration,
    ) -> Result<Vec<NodeId>, BrowserError> {
        let dom = self.dom.lock().unwrap();
        let mut found = Vec::new();
        for &root in &dom.roots {
            if dom.node(root).matches(selector) {
                found.push(root);
            }
            dom.descendants(root, selector, &mut found);
        }

        if found.is_empty() {
            Err(BrowserError::TimedOut {
                selector: selector.to_string(),
                timeout,
            })
        } else {
            Ok(found)
        }
    }

    async fn find_all(&self, scope: &NodeId, selector: &Css) -> Result<Vec<NodeId>, BrowserError> {
        let dom = self.dom.lock().unwrap();
        let mut found = Vec::new();
        dom.descendants(*scope, selector, &mut found);
        Ok(found)
    }

    async fn find(&self, scope: &NodeId, selector: &Css) -> Result<NodeId, BrowserError> {
        self.find_all(scope, selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::NotFound {
                selector: selector.to_string(),
            })
    }

    async fn click(&self, element: &NodeId) -> Result<(), BrowserError> {
        let mut dom = self.dom.lock().unwrap();
        let behavior = dom.node(*element).click;
        match behavior {
            ClickBehavior::Normal => {
                dom.activate(*element, ActivationStrategy::Native);
                Ok(())
            }
            ClickBehavior::Intercepted | ClickBehavior::Blocked => {
                Err(BrowserError::ClickIntercepted)
            }
            ClickBehavior::Stale => Err(stale()),
        }
    }

    async fn force_click(&self, element: &NodeId) -> Result<(), BrowserError> {
        let mut dom = self.dom.lock().unwrap();
        let behavior = dom.node(*element).click;
        match behavior {
            ClickBehavior::Normal | ClickBehavior::Intercepted => {
                dom.activate(*element, ActivationStrategy::Forced);
                Ok(())
            }
            ClickBehavior::Blocked => Err(BrowserError::ClickIntercepted),
            ClickBehavior::Stale => Err(stale()),
        }
    }

    async fn scroll_into_view(&self, element: &NodeId) -> Result<(), BrowserError> {
        let mut dom = self.dom.lock().unwrap();
        if dom.node(*element).scroll_fails {
            return Err(stale());
        }
        dom.scrolled.push(*element);
        Ok(())
    }

    async fn attribute(
        &self,
        element: &NodeId,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        let dom = self.dom.lock().unwrap();
        Ok(dom.node(*element).attrs.get(name).cloned())
    }

    async fn text(&self, element: &NodeId) -> Result<String, BrowserError> {
        let dom = self.dom.lock().unwrap();
        Ok(dom.node(*element).text.clone())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.url.clone())
    }
}
