use crate::error::MixError;
use crate::fixture::palette::Palette;
use crate::mixing::allocator::Allocation;
use std::fmt;
use std::sync::Arc;

/// Duty code for full output on the reference lamp
pub const REFERENCE_MAX_CODE: u8 = 255;

/// Frame layout of the lamp firmware: red, green, blue, amber, white
pub const RGBAW_WIRING: [(&str, usize); 5] = [
    ("red", 0),
    ("green", 1),
    ("blue", 2),
    ("amber", 3),
    ("white", 4),
];

/// Channel order of the first prototype firmware, green and blue swapped
pub const PROTOTYPE_WIRING: [(&str, usize); 5] = [
    ("red", 0),
    ("blue", 1),
    ("green", 2),
    ("amber", 3),
    ("white", 4),
];

/// Primary name to position in the frame
#[derive(Clone, Debug, PartialEq)]
pub struct WiringTable {
    slots: Vec<(String, usize)>,
}

impl WiringTable {
    /// Slots must be unique and cover 0..entries.len()
    pub fn new<S: AsRef<str>>(entries: &[(S, usize)]) -> Result<WiringTable, MixError> {
        let mut used = vec![false; entries.len()];
        for (i, (name, slot)) in entries.iter().enumerate() {
            let name = name.as_ref();
            if entries[..i].iter().any(|(n, _)| n.as_ref() == name) {
                return Err(MixError::InvalidWiring(format!("{} wired twice", name)));
            }
            match used.get_mut(*slot) {
                Some(true) => {
                    return Err(MixError::InvalidWiring(format!(
                        "slot {} used more than once",
                        slot
                    )))
                }
                Some(u) => *u = true,
                None => {
                    return Err(MixError::InvalidWiring(format!(
                        "slot {} of {} is outside the frame",
                        slot, name
                    )))
                }
            }
        }
        Ok(WiringTable {
            slots: entries
                .iter()
                .map(|(n, s)| (n.as_ref().to_string(), *s))
                .collect(),
        })
    }

    /// Names listed in frame order
    pub fn from_order<S: AsRef<str>>(names: &[S]) -> Result<WiringTable, MixError> {
        let entries: Vec<(&str, usize)> = names
            .iter()
            .enumerate()
            .map(|(slot, n)| (n.as_ref(), slot))
            .collect();
        WiringTable::new(&entries)
    }

    pub fn rgbaw() -> WiringTable {
        WiringTable::fixed(&RGBAW_WIRING)
    }

    pub fn prototype() -> WiringTable {
        WiringTable::fixed(&PROTOTYPE_WIRING)
    }

    fn fixed(entries: &[(&str, usize)]) -> WiringTable {
        WiringTable {
            slots: entries.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
        }
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }

    /// Number of channels in a frame
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names_in_slot_order(&self) -> Vec<&str> {
        let mut names = vec![""; self.slots.len()];
        for (n, s) in &self.slots {
            names[*s] = n.as_str();
        }
        names
    }
}

/// Duty codes in wiring order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame(pub Vec<u8>);

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Turns allocations into frames
#[derive(Clone, Debug)]
pub struct FrameEncoder {
    palette: Arc<Palette>,
    wiring: WiringTable,
    // Slot of each palette entry
    slots: Vec<usize>,
    max_code: u8,
}

impl FrameEncoder {
    /// Every primary in the palette must be wired, and nothing else.
    pub fn new(
        palette: Arc<Palette>,
        wiring: WiringTable,
        max_code: u8,
    ) -> Result<FrameEncoder, MixError> {
        let slots = palette
            .iter()
            .map(|p| {
                wiring
                    .slot(p.name())
                    .ok_or_else(|| MixError::InvalidWiring(format!("{} is not wired", p.name())))
            })
            .collect::<Result<Vec<usize>, MixError>>()?;
        if let Some((name, _)) = wiring
            .slots
            .iter()
            .find(|(n, _)| palette.index_of(n).is_none())
        {
            return Err(MixError::InvalidWiring(format!(
                "{} is wired but not in the palette",
                name
            )));
        }
        if max_code == 0 {
            return Err(MixError::InvalidWiring("max code is 0".to_string()));
        }
        Ok(FrameEncoder {
            palette,
            wiring,
            slots,
            max_code,
        })
    }

    pub fn wiring(&self) -> &WiringTable {
        &self.wiring
    }

    pub fn max_code(&self) -> u8 {
        self.max_code
    }

    pub fn frame_len(&self) -> usize {
        self.wiring.len()
    }

    /// Primaries missing from the allocation are off.
    pub fn encode(&self, allocation: &Allocation) -> Result<Frame, MixError> {
        let mut codes = vec![0u8; self.wiring.len()];
        for c in allocation.iter() {
            let (Some(primary), Some(&slot)) = (self.palette.get(c.primary), self.slots.get(c.primary))
            else {
                return Err(MixError::InvalidPalette(format!(
                    "primary {} is not in the palette",
                    c.primary
                )));
            };
            codes[slot] = primary.quantize(c.luminance, self.max_code)?;
        }
        Ok(Frame(codes))
    }
}
