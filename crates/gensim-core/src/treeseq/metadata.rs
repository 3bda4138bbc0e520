use gensim_error::{GensimError, GensimResult};

use crate::mutation::Nucleotide;

/// Bit-exact mutation metadata row (spec §4.9: "Mutation: 17 bytes —
/// muttype-id (4), effect (4), origin-subpop (4), origin-tick (4),
/// nucleotide (1 signed)"). Little-endian throughout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationMetadata {
    pub muttype_id: u32,
    pub effect: f32,
    pub origin_subpop_id: u32,
    pub origin_tick: u32,
    pub nucleotide: Nucleotide,
}

pub const MUTATION_METADATA_LEN: usize = 17;

impl MutationMetadata {
    pub fn to_bytes(&self) -> [u8; MUTATION_METADATA_LEN] {
        let mut buf = [0u8; MUTATION_METADATA_LEN];
        buf[0..4].copy_from_slice(&self.muttype_id.to_le_bytes());
        buf[4..8].copy_from_slice(&self.effect.to_le_bytes());
        buf[8..12].copy_from_slice(&self.origin_subpop_id.to_le_bytes());
        buf[12..16].copy_from_slice(&self.origin_tick.to_le_bytes());
        buf[16] = self.nucleotide.as_signed_byte() as u8;
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> GensimResult<Self> {
        if buf.len() != MUTATION_METADATA_LEN {
            return Err(GensimError::invariant(format!(
                "mutation metadata must be {MUTATION_METADATA_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let muttype_id = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let effect = f32::from_le_bytes(buf[4..8].try_into().unwrap());
        let origin_subpop_id = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        let origin_tick = u32::from_le_bytes(buf[12..16].try_into().unwrap());
        let nucleotide = match buf[16] as i8 {
            0 => Nucleotide::A,
            1 => Nucleotide::C,
            2 => Nucleotide::G,
            3 => Nucleotide::T,
            _ => Nucleotide::None,
        };
        Ok(MutationMetadata { muttype_id, effect, origin_subpop_id, origin_tick, nucleotide })
    }
}

/// Bit-exact individual metadata row (spec §4.9: "Individual: 40 bytes —
/// pedigree id (8), parent 1 pedigree id (8), parent 2 pedigree id (8), age
/// (4), subpop id (4), sex (4), flag bits (4)").
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndividualMetadata {
    pub pedigree_id: i64,
    pub parent1_pedigree_id: i64,
    pub parent2_pedigree_id: i64,
    pub age: i32,
    pub subpop_id: u32,
    pub sex: u32,
    pub flags: u32,
}

pub const INDIVIDUAL_METADATA_LEN: usize = 40;

impl IndividualMetadata {
    pub fn to_bytes(&self) -> [u8; INDIVIDUAL_METADATA_LEN] {
        let mut buf = [0u8; INDIVIDUAL_METADATA_LEN];
        buf[0..8].copy_from_slice(&self.pedigree_id.to_le_bytes());
        buf[8..16].copy_from_slice(&self.parent1_pedigree_id.to_le_bytes());
        buf[16..24].copy_from_slice(&self.parent2_pedigree_id.to_le_bytes());
        buf[24..28].copy_from_slice(&self.age.to_le_bytes());
        buf[28..32].copy_from_slice(&self.subpop_id.to_le_bytes());
        buf[32..36].copy_from_slice(&self.sex.to_le_bytes());
        buf[36..40].copy_from_slice(&self.flags.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8]) -> GensimResult<Self> {
        if buf.len() != INDIVIDUAL_METADATA_LEN {
            return Err(GensimError::invariant(format!(
                "individual metadata must be {INDIVIDUAL_METADATA_LEN} bytes, got {}",
                buf.len()
            )));
        }
        Ok(IndividualMetadata {
            pedigree_id: i64::from_le_bytes(buf[0..8].try_into().unwrap()),
            parent1_pedigree_id: i64::from_le_bytes(buf[8..16].try_into().unwrap()),
            parent2_pedigree_id: i64::from_le_bytes(buf[16..24].try_into().unwrap()),
            age: i32::from_le_bytes(buf[24..28].try_into().unwrap()),
            subpop_id: u32::from_le_bytes(buf[28..32].try_into().unwrap()),
            sex: u32::from_le_bytes(buf[32..36].try_into().unwrap()),
            flags: u32::from_le_bytes(buf[36..40].try_into().unwrap()),
        })
    }
}

/// Variable-length haplosome node metadata for multi-chromosome models: an
/// 8-byte haplosome id followed by a bitmap recording, for each haplosome
/// slot sharing this node across chromosomes, whether that slot is vacant
/// (spec §4.9, §9 "the encoded width is derived from
/// `haplosome_count_per_individual_`... frozen at simulation start").
#[derive(Clone, Debug, PartialEq)]
pub struct HaplosomeNodeMetadata {
    pub haplosome_id: u64,
    is_vacant: Vec<bool>,
}

impl HaplosomeNodeMetadata {
    pub fn new(haplosome_id: u64, slot_count: usize) -> Self {
        HaplosomeNodeMetadata { haplosome_id, is_vacant: vec![false; slot_count] }
    }

    pub fn set_vacant(&mut self, slot: usize, vacant: bool) {
        self.is_vacant[slot] = vacant;
    }

    pub fn is_vacant(&self, slot: usize) -> bool {
        self.is_vacant[slot]
    }

    pub fn slot_count(&self) -> usize {
        self.is_vacant.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let bitmap_bytes = self.is_vacant.len().div_ceil(8);
        let mut buf = Vec::with_capacity(8 + bitmap_bytes);
        buf.extend_from_slice(&self.haplosome_id.to_le_bytes());
        let mut bitmap = vec![0u8; bitmap_bytes];
        for (i, vacant) in self.is_vacant.iter().enumerate() {
            if *vacant {
                bitmap[i / 8] |= 1 << (i % 8);
            }
        }
        buf.extend_from_slice(&bitmap);
        buf
    }

    pub fn from_bytes(buf: &[u8], slot_count: usize) -> GensimResult<Self> {
        let expected = 8 + slot_count.div_ceil(8);
        if buf.len() != expected {
            return Err(GensimError::invariant(format!(
                "haplosome node metadata must be {expected} bytes for {slot_count} slots, got {}",
                buf.len()
            )));
        }
        let haplosome_id = u64::from_le_bytes(buf[0..8].try_into().unwrap());
        let bitmap = &buf[8..];
        let is_vacant = (0..slot_count).map(|i| bitmap[i / 8] & (1 << (i % 8)) != 0).collect();
        Ok(HaplosomeNodeMetadata { haplosome_id, is_vacant })
    }
}
