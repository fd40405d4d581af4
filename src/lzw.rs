//! LZW Coder
//!
//! A fixed-parameter LZW encoder matching the PostScript `LZWDecode` filter's
//! defaults: 8-bit input alphabet, 9-12 bit codes with early width change,
//! CLEAR-TABLE=256, END-OF-DATA=257, first dynamic code 258, 4096-entry table.
//!
//! The dictionary is an unbalanced binary search tree keyed by the terminal
//! byte of each string, as in the historical MEX reference this crate's
//! format is drawn from; this guarantees the same code gets allocated for
//! the same string in the same order on every run, which a hash-map
//! dictionary would not promise bit-for-bit.

use crate::ascii85::Packer;
use crate::Error;
use std::io::Write;

pub const CLEAR_TABLE: u32 = 256;
pub const END_OF_DATA: u32 = 257;
const FIRST_FREE: u16 = 258;
const TABLE_SIZE: usize = 4096;
const MIN_WIDTH: u32 = 9;
const MAX_WIDTH: u32 = 12;

/// One dictionary entry: the terminal byte of the string it represents, plus
/// the three BST links used to search among this prefix's extensions.
/// Entries 0..255 only ever use the link fields; `term` is meaningless there
/// since those codes are single bytes whose value equals their index.
#[derive(Clone, Copy)]
struct Node {
    term: u8,
    child: u16,
    left: u16,
    right: u16,
}

impl Node {
    const EMPTY: Node = Node { term: 0, child: 0, left: 0, right: 0 };
}

#[derive(Clone, Copy)]
enum Slot {
    Child,
    Left,
    Right,
}

/// Holds the LZW compression state for one segment.
pub struct Coder {
    nodes: Box<[Node; TABLE_SIZE]>,
    next_free: u16,
    width: u32,
    /// the longest dictionary string matching the input consumed but not yet
    /// emitted; `None` at the start of a segment or just after a reset.
    prefix: Option<u16>,
}

impl Default for Coder {
    fn default() -> Self {
        Self::new()
    }
}

impl Coder {
    pub fn new() -> Self {
        Self {
            nodes: Box::new([Node::EMPTY; TABLE_SIZE]),
            next_free: FIRST_FREE,
            width: MIN_WIDTH,
            prefix: None,
        }
    }

    fn reset(&mut self) {
        for n in self.nodes.iter_mut() {
            *n = Node::EMPTY;
        }
        self.next_free = FIRST_FREE;
        self.width = MIN_WIDTH;
    }

    /// Reset the dictionary and emit CLEAR-TABLE at the initial width.
    pub fn begin<W: Write>(&mut self, packer: &mut Packer<W>) -> Result<(), Error> {
        log::debug!("opening LZW segment");
        self.reset();
        self.prefix = None;
        packer.push(CLEAR_TABLE, MIN_WIDTH)
    }

    /// Consume one input byte, possibly emitting a code.
    pub fn feed<W: Write>(&mut self, byte: u8, packer: &mut Packer<W>) -> Result<(), Error> {
        let prefix = match self.prefix {
            None => {
                self.prefix = Some(byte as u16);
                return Ok(());
            }
            Some(p) => p,
        };
        let child = self.nodes[prefix as usize].child;
        if child == 0 {
            return self.emit_and_insert(prefix, prefix, Slot::Child, byte, packer);
        }
        let mut x = child;
        loop {
            let node_term = self.nodes[x as usize].term;
            if byte == node_term {
                self.prefix = Some(x);
                return Ok(());
            } else if byte < node_term {
                let left = self.nodes[x as usize].left;
                if left == 0 {
                    return self.emit_and_insert(prefix, x, Slot::Left, byte, packer);
                }
                x = left;
            } else {
                let right = self.nodes[x as usize].right;
                if right == 0 {
                    return self.emit_and_insert(prefix, x, Slot::Right, byte, packer);
                }
                x = right;
            }
        }
    }

    /// Emit `prefix` as a code, install a new entry for `prefix . byte` as
    /// the given child slot of `parent`, then adopt `byte` as the new prefix.
    fn emit_and_insert<W: Write>(
        &mut self,
        prefix: u16,
        parent: u16,
        slot: Slot,
        byte: u8,
        packer: &mut Packer<W>,
    ) -> Result<(), Error> {
        packer.push(prefix as u32, self.width)?;
        log::trace!("code {} width {}", prefix, self.width);

        let new_code = self.next_free;
        self.nodes[new_code as usize] = Node { term: byte, child: 0, left: 0, right: 0 };
        match slot {
            Slot::Child => self.nodes[parent as usize].child = new_code,
            Slot::Left => self.nodes[parent as usize].left = new_code,
            Slot::Right => self.nodes[parent as usize].right = new_code,
        }
        self.next_free += 1;
        self.prefix = Some(byte as u16);

        if self.next_free == (1u16 << self.width) {
            if self.width == MAX_WIDTH {
                log::debug!("dictionary full, resetting");
                packer.push(CLEAR_TABLE, self.width)?;
                self.reset();
                self.prefix = Some(byte as u16);
            } else {
                self.width += 1;
            }
        }
        Ok(())
    }

    /// Emit the pending prefix (if any) and END-OF-DATA, then finish the
    /// packer and hand its sink back.
    pub fn end<W: Write>(&mut self, mut packer: Packer<W>) -> Result<W, Error> {
        log::debug!("closing LZW segment");
        if let Some(p) = self.prefix.take() {
            packer.push(p as u32, self.width)?;
        }
        packer.push(END_OF_DATA, self.width)?;
        packer.finish()
    }
}
