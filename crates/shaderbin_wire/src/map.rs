//! Name to index tables (attribute bindings, fragment outputs, uniform locations).

use std::collections::BTreeMap;

use crate::cursor::ByteCursor;
use crate::error::WireError;
use crate::sink::ByteSink;

/// A mapping from a GLSL name to a small integer such as a binding index or
/// uniform location.
///
/// Ordered so that serialized tables are byte-for-byte deterministic.
pub type NameValueMap = BTreeMap<String, u32>;

/// Writes a `u32` entry count followed by `(string key, u32 value)` pairs.
pub fn write_map(sink: &mut ByteSink, map: &NameValueMap) -> Result<(), WireError> {
    let count = u32::try_from(map.len()).map_err(|_| WireError::TooLong { len: map.len() })?;
    sink.write_u32(count);
    for (name, &value) in map {
        sink.write_string(Some(name.as_str()))?;
        sink.write_u32(value);
    }
    Ok(())
}

/// Reads a table written by [`write_map`] and inserts its entries into `map`.
///
/// Existing entries are kept unless the table overrides them; duplicate keys
/// within the table resolve to the last value. Fails immediately if the
/// cursor has already faulted, and stops at the first bad entry.
pub fn read_map_into(cursor: &mut ByteCursor<'_>, map: &mut NameValueMap) -> Result<(), WireError> {
    cursor.check()?;
    let count = cursor.read_u32()?;

    for _ in 0..count {
        let offset = cursor.position();
        let Some(name) = cursor.read_string()? else {
            return Err(cursor.poison(WireError::MissingKey { offset }));
        };
        let value = cursor.read_u32()?;
        map.insert(name, value);
    }

    Ok(())
}
