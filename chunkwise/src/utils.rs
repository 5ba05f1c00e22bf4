use core::hash::Hash;
use core::ops::{Deref, DerefMut};

use bincode::{
    de::{BorrowDecoder, Decoder},
    enc::Encoder,
    error::{DecodeError, EncodeError},
    BorrowDecode, Decode, Encode,
};
use hashbrown::HashMap;

/// A hash map stored as a counted list of `(key, value)` records.
#[derive(Debug, Default, Clone)]
pub struct SerializableHashMap<K, V>(pub HashMap<K, V>);

impl<K, V> Deref for SerializableHashMap<K, V> {
    type Target = HashMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> DerefMut for SerializableHashMap<K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K, V> Decode for SerializableHashMap<K, V>
where
    K: Decode + Eq + Hash,
    V: Decode,
{
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let len = u64::decode(decoder)?;
        let len = usize::try_from(len).map_err(|_| DecodeError::OutsideUsizeRange(len))?;
        let mut map = HashMap::new();
        for _ in 0..len {
            let k = K::decode(decoder)?;
            let v = V::decode(decoder)?;
            map.insert(k, v);
        }
        Ok(Self(map))
    }
}

impl<'de, K, V> BorrowDecode<'de> for SerializableHashMap<K, V>
where
    K: Decode + Eq + Hash,
    V: Decode,
{
    fn borrow_decode<D: BorrowDecoder<'de>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Self::decode(decoder)
    }
}

impl<K, V> Encode for SerializableHashMap<K, V>
where
    K: Encode,
    V: Encode,
{
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        (self.0.len() as u64).encode(encoder)?;
        for (k, v) in &self.0 {
            k.encode(encoder)?;
            v.encode(encoder)?;
        }
        Ok(())
    }
}
