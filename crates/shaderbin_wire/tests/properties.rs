use proptest::prelude::*;
use shaderbin_wire::{read_map_into, write_map, ByteCursor, ByteSink, NameValueMap};

proptest! {
    #[test]
    fn strings_roundtrip(value in proptest::option::of("[^\\x00]{0,64}")) {
        let mut sink = ByteSink::new();
        sink.write_string(value.as_deref()).unwrap();
        let bytes = sink.release();

        let mut cursor = ByteCursor::new(&bytes);
        prop_assert_eq!(cursor.read_string().unwrap(), value);
        prop_assert!(cursor.remaining().is_empty());
    }

    #[test]
    fn cursor_never_reads_past_end(
        data in proptest::collection::vec(any::<u8>(), 0..64),
        ops in proptest::collection::vec(0u8..5, 1..32),
    ) {
        let mut cursor = ByteCursor::new(&data);
        let mut faulted_at = None;
        for op in ops {
            let result = match op {
                0 => cursor.read_u8().map(|_| ()),
                1 => cursor.read_u32().map(|_| ()),
                2 => cursor.read_string().map(|_| ()),
                3 => cursor.read_bool().map(|_| ()),
                _ => cursor.read_bytes(7).map(|_| ()),
            };
            prop_assert!(cursor.position() <= data.len());
            match (result, faulted_at) {
                (Err(_), None) => faulted_at = Some(cursor.position()),
                (Ok(()), Some(_)) => prop_assert!(false, "read succeeded after a fault"),
                (_, Some(pos)) => prop_assert_eq!(cursor.position(), pos),
                (Ok(()), None) => {}
            }
        }
        prop_assert_eq!(cursor.failed(), faulted_at.is_some());
    }

    #[test]
    fn maps_roundtrip(entries in proptest::collection::btree_map("[a-zA-Z_][a-zA-Z0-9_]{0,16}", any::<u32>(), 0..16)) {
        let map: NameValueMap = entries;
        let mut sink = ByteSink::new();
        write_map(&mut sink, &map).unwrap();
        let bytes = sink.release();

        let mut back = NameValueMap::new();
        read_map_into(&mut ByteCursor::new(&bytes), &mut back).unwrap();
        prop_assert_eq!(back, map);
    }

    #[test]
    fn truncated_maps_fail(entries in proptest::collection::btree_map("[a-z]{1,8}", any::<u32>(), 1..8), cut in any::<prop::sample::Index>()) {
        let map: NameValueMap = entries;
        let mut sink = ByteSink::new();
        write_map(&mut sink, &map).unwrap();
        let bytes = sink.release();
        let len = cut.index(bytes.len());

        let mut back = NameValueMap::new();
        prop_assert!(read_map_into(&mut ByteCursor::new(&bytes[..len]), &mut back).is_err());
    }
}
