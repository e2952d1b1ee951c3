use serde::{Deserialize, Serialize};

use crate::block::BlockId;

pub const MAX_STACK_SIZE: u8 = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    #[serde(rename = "blockType")]
    pub block: BlockId,
    #[serde(rename = "amount")]
    pub count: u8,
}

impl ItemStack {
    /// Counts above [`MAX_STACK_SIZE`] are clamped.
    pub fn new(block: BlockId, count: u8) -> Self {
        Self {
            block,
            count: count.min(MAX_STACK_SIZE),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn space_left(&self) -> u8 {
        MAX_STACK_SIZE.saturating_sub(self.count)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    #[serde(with = "inventory_slots_serde")]
    pub slots: [Option<ItemStack>; Self::TOTAL_SIZE],
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    pub const HOTBAR_SIZE: usize = 9;
    pub const MAIN_SIZE: usize = 27;
    pub const TOTAL_SIZE: usize = Self::HOTBAR_SIZE + Self::MAIN_SIZE;

    pub fn new() -> Self {
        Self {
            slots: [None; Self::TOTAL_SIZE],
        }
    }

    /// Non-empty stack in `slot`. Slots holding a zero count read as empty.
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .filter(|stack| !stack.is_empty())
    }

    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) {
        if let Some(target) = self.slots.get_mut(slot) {
            *target = stack;
        }
    }

    pub fn hotbar(&self) -> &[Option<ItemStack>] {
        &self.slots[..Self::HOTBAR_SIZE]
    }

    pub fn hotbar_slot(&self, idx: usize) -> Option<&ItemStack> {
        if idx >= Self::HOTBAR_SIZE {
            return None;
        }
        self.get(idx)
    }

    /// Returns how many items did not fit.
    pub fn add_item(&mut self, block: BlockId, count: u8) -> u8 {
        let mut remaining = count;

        for slot in &mut self.slots {
            if remaining == 0 {
                return 0;
            }

            if let Some(stack) = slot.as_mut() {
                if stack.block == block && !stack.is_empty() && stack.count < MAX_STACK_SIZE {
                    let moved = stack.space_left().min(remaining);
                    stack.count += moved;
                    remaining -= moved;
                }
            }
        }

        for slot in &mut self.slots {
            if remaining == 0 {
                return 0;
            }

            if slot.map_or(true, |stack| stack.is_empty()) {
                let moved = remaining.min(MAX_STACK_SIZE);
                *slot = Some(ItemStack::new(block, moved));
                remaining -= moved;
            }
        }

        remaining
    }

    pub fn remove_item(&mut self, slot: usize, count: u8) -> Option<ItemStack> {
        if count == 0 {
            return None;
        }

        let slot_ref = self.slots.get_mut(slot)?;
        let stack = slot_ref.as_mut()?;
        let removed_count = stack.count.min(count);
        if removed_count == 0 {
            return None;
        }

        let removed = ItemStack::new(stack.block, removed_count);
        stack.count -= removed_count;
        if stack.count == 0 {
            *slot_ref = None;
        }

        Some(removed)
    }

    pub fn count_item(&self, block: BlockId) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| stack.block == block)
            .map(|stack| u32::from(stack.count))
            .sum()
    }

    pub fn clear(&mut self) {
        self.slots = [None; Self::TOTAL_SIZE];
    }
}

mod inventory_slots_serde {
    use serde::de::{Error, Unexpected};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Inventory, ItemStack, MAX_STACK_SIZE};

    pub fn serialize<S>(
        slots: &[Option<ItemStack>; Inventory::TOTAL_SIZE],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        slots.as_slice().serialize(serializer)
    }

    /// Shorter sequences are padded with empty slots. Amounts above
    /// [`MAX_STACK_SIZE`] are rejected.
    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<[Option<ItemStack>; Inventory::TOTAL_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let stored = Vec::<Option<ItemStack>>::deserialize(deserializer)?;
        if stored.len() > Inventory::TOTAL_SIZE {
            return Err(D::Error::invalid_length(
                stored.len(),
                &"at most Inventory::TOTAL_SIZE slots",
            ));
        }

        let mut slots = [None; Inventory::TOTAL_SIZE];
        for (slot, stack) in slots.iter_mut().zip(stored) {
            if let Some(stack) = stack.filter(|stack| stack.count > MAX_STACK_SIZE) {
                return Err(D::Error::invalid_value(
                    Unexpected::Unsigned(u64::from(stack.count)),
                    &"a stack amount of at most 64",
                ));
            }
            *slot = stack;
        }
        Ok(slots)
    }
}
