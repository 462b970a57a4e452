//! Flattened devicetree (DTB) ingestion.
//!
//! Exposes a compiled blob as a tree of named nodes with typed property
//! lookup and child iteration. Only the container structure is decoded here;
//! interpreting property contents is the caller's business.

use anyhow::{bail, ensure, Result};

const FDT_MAGIC: u32 = 0xd00d_feed;

const FDT_BEGIN_NODE: u32 = 0x1;
const FDT_END_NODE: u32 = 0x2;
const FDT_PROP: u32 = 0x3;
const FDT_NOP: u32 = 0x4;
const FDT_END: u32 = 0x9;

/// One node of the parsed tree.
#[derive(Debug, Default, Clone)]
pub struct Node {
    name: String,
    props: Vec<(String, Vec<u8>)>,
    children: Vec<Node>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn add_prop(&mut self, name: impl Into<String>, value: Vec<u8>) {
        self.props.push((name.into(), value));
    }

    pub(crate) fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// The node's own name, unit address included (e.g. `gpio@40081000`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn has_prop(&self, name: &str) -> bool {
        self.props.iter().any(|(prop, _)| prop == name)
    }

    /// Raw property bytes.
    pub fn prop_raw(&self, name: &str) -> Option<&[u8]> {
        self.props
            .iter()
            .find(|(prop, _)| prop == name)
            .map(|(_, value)| value.as_slice())
    }

    /// Property as a single big-endian 32-bit cell. `None` if absent or not
    /// exactly one cell wide.
    pub fn prop_u32(&self, name: &str) -> Option<u32> {
        let value: &[u8; 4] = self.prop_raw(name)?.try_into().ok()?;
        Some(u32::from_be_bytes(*value))
    }

    /// Property as a NUL-terminated string.
    pub fn prop_str(&self, name: &str) -> Option<&str> {
        let value = self.prop_raw(name)?;
        let value = value.strip_suffix(&[0])?;
        std::str::from_utf8(value).ok()
    }

    /// Property as a list of NUL-terminated strings (e.g. `compatible`).
    pub fn prop_string_list(&self, name: &str) -> Vec<&str> {
        let Some(value) = self.prop_raw(name) else {
            return Vec::new();
        };
        value
            .split(|&b| b == 0)
            .filter(|s| !s.is_empty())
            .filter_map(|s| std::str::from_utf8(s).ok())
            .collect()
    }

    /// Visit this node and all descendants, depth first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// All nodes in the subtree matching the predicate.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Node) -> bool) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if pred(node) {
                found.push(node);
            }
        });
        found
    }
}

/// Parse a flattened devicetree blob into its root node.
pub fn parse(blob: &[u8]) -> Result<Node> {
    ensure!(blob.len() >= 40, "blob too short for a devicetree header");
    let magic = be32(blob, 0)?;
    ensure!(
        magic == FDT_MAGIC,
        "bad devicetree magic {magic:#010x}, expected {FDT_MAGIC:#010x}"
    );

    let off_struct = be32(blob, 8)? as usize;
    let off_strings = be32(blob, 12)? as usize;

    let mut parser = Parser {
        blob,
        pos: off_struct,
        off_strings,
    };

    match parser.token()? {
        FDT_BEGIN_NODE => {}
        token => bail!("expected root node, found token {token:#x}"),
    }
    let root = parser.node()?;
    ensure!(parser.token()? == FDT_END, "trailing data after root node");

    Ok(root)
}

fn be32(blob: &[u8], pos: usize) -> Result<u32> {
    let bytes: [u8; 4] = blob
        .get(pos..pos + 4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| anyhow::anyhow!("truncated blob at offset {pos:#x}"))?;
    Ok(u32::from_be_bytes(bytes))
}

struct Parser<'a> {
    blob: &'a [u8],
    pos: usize,
    off_strings: usize,
}

impl Parser<'_> {
    fn u32(&mut self) -> Result<u32> {
        let value = be32(self.blob, self.pos)?;
        self.pos += 4;
        Ok(value)
    }

    /// Next structure token, transparently skipping NOPs.
    fn token(&mut self) -> Result<u32> {
        loop {
            let token = self.u32()?;
            if token != FDT_NOP {
                return Ok(token);
            }
        }
    }

    /// NUL-terminated string at the cursor; advances past the 32-bit padding.
    fn cstr(&mut self) -> Result<String> {
        let rest = self
            .blob
            .get(self.pos..)
            .ok_or_else(|| anyhow::anyhow!("name offset {:#x} outside the blob", self.pos))?;
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            bail!("unterminated name at offset {:#x}", self.pos);
        };
        let name = std::str::from_utf8(&rest[..len])
            .map_err(|_| anyhow::anyhow!("non-UTF-8 name at offset {:#x}", self.pos))?
            .to_string();
        self.pos += (len + 4) & !3;
        Ok(name)
    }

    /// String-table entry for a property name.
    fn string(&self, offset: u32) -> Result<String> {
        let pos = self.off_strings + offset as usize;
        let rest = self
            .blob
            .get(pos..)
            .ok_or_else(|| anyhow::anyhow!("string offset {offset:#x} outside the blob"))?;
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            bail!("unterminated string at offset {pos:#x}");
        };
        Ok(std::str::from_utf8(&rest[..len])
            .map_err(|_| anyhow::anyhow!("non-UTF-8 string at offset {pos:#x}"))?
            .to_string())
    }

    /// Parse the body of a node whose BEGIN_NODE token was just consumed.
    fn node(&mut self) -> Result<Node> {
        let mut node = Node::new(self.cstr()?);

        loop {
            match self.token()? {
                FDT_PROP => {
                    let len = self.u32()? as usize;
                    let nameoff = self.u32()?;
                    let Some(value) = self.blob.get(self.pos..self.pos + len) else {
                        bail!("truncated property value at offset {:#x}", self.pos);
                    };
                    let value = value.to_vec();
                    self.pos += (len + 3) & !3;
                    node.add_prop(self.string(nameoff)?, value);
                }
                FDT_BEGIN_NODE => {
                    let child = self.node()?;
                    node.add_child(child);
                }
                FDT_END_NODE => return Ok(node),
                token => bail!("unexpected token {token:#x} at offset {:#x}", self.pos - 4),
            }
        }
    }
}
