use super::register::Register;
use crate::ErrorKind;

/// Identity of a register attached to a chain, used to detach it again
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "with_serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "with_bincode", derive(bincode::Decode, bincode::Encode))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterId(u32);

/// Register blocks of a slave, kept in registration order
///
/// The order matters: a request spanning several blocks is resolved by walking forward from
/// the block where it starts, so blocks must be added with ascending addresses. Neither order
/// nor overlapping is checked.
pub struct RegisterChain<'a, const N: usize> {
    entries: heapless::Vec<(RegisterId, Register<'a>), N>,
    next_id: u32,
}

impl<const N: usize> Default for RegisterChain<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> RegisterChain<'a, N> {
    pub fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
            next_id: 0,
        }
    }

    /// Append a block to the end of the chain
    pub fn push(&mut self, register: Register<'a>) -> Result<RegisterId, ErrorKind> {
        let id = RegisterId(self.next_id);
        self.entries
            .push((id, register))
            .map_err(|_| ErrorKind::OOBChain)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    /// Detach a block, giving it (and the borrow of its memory) back
    ///
    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: RegisterId) -> Option<Register<'a>> {
        let pos = self.entries.iter().position(|(i, _)| *i == id)?;
        Some(self.entries.remove(pos).1)
    }

    /// Detach all blocks. Ids already handed out stay invalid.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Chain position of the first block starting at `address`
    pub fn position(&self, address: u16) -> Option<usize> {
        self.entries
            .iter()
            .position(|(_, reg)| reg.address == address)
    }

    /// First block starting at `address`
    pub fn find(&self, address: u16) -> Option<&Register<'a>> {
        self.position(address).map(|pos| &self.entries[pos].1)
    }

    pub fn get(&self, id: RegisterId) -> Option<&Register<'a>> {
        self.entries
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, reg)| reg)
    }

    pub fn get_mut(&mut self, id: RegisterId) -> Option<&mut Register<'a>> {
        self.entries
            .iter_mut()
            .find(|(i, _)| *i == id)
            .map(|(_, reg)| reg)
    }

    pub(crate) fn at_mut(&mut self, pos: usize) -> Option<&mut Register<'a>> {
        self.entries.get_mut(pos).map(|(_, reg)| reg)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Register<'a>> {
        self.entries.iter().map(|(_, reg)| reg)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
