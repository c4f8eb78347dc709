use bytes::{BufMut, Bytes, BytesMut};
use std::sync::Arc;

use pgcomposite::{
    BufferedReader, CompositeType, ErrorKind, FieldDecoder, Record, TypeRegistry, Value,
    composite::ResolveState,
    postgres::{ProtocolError, oid},
};

const ADDRESS: u32 = 16_400;
const PERSON: u32 = 16_410;

fn address() -> Arc<CompositeType> {
    Arc::new(
        CompositeType::new(ADDRESS, "public.address")
            .field("street", oid::TEXT)
            .field("number", oid::INT4),
    )
}

fn person() -> Arc<CompositeType> {
    Arc::new(
        CompositeType::new(PERSON, "public.person")
            .field("name", oid::VARCHAR)
            .field("home", ADDRESS)
            .field("tags", oid::TEXT_ARRAY)
            .field("age", oid::INT2),
    )
}

/// Write composite value, `None` field is written as null.
fn composite(fields: &[(u32, Option<Bytes>)]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_i32(fields.len() as i32);
    for (oid, value) in fields {
        buf.put_u32(*oid);
        match value {
            Some(value) => {
                buf.put_i32(value.len() as i32);
                buf.put_slice(value);
            }
            None => buf.put_i32(-1),
        }
    }
    buf.freeze()
}

fn text_array(values: &[&str]) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_i32(1);
    buf.put_i32(0);
    buf.put_u32(oid::TEXT);
    buf.put_i32(values.len() as i32);
    buf.put_i32(1);
    for value in values {
        buf.put_i32(value.len() as i32);
        buf.put_slice(value.as_bytes());
    }
    buf.freeze()
}

fn home() -> Bytes {
    composite(&[
        (oid::TEXT, Some(Bytes::from_static(b"Jl. Sudirman"))),
        (oid::INT4, Some(Bytes::from_static(&[0, 0, 0, 12]))),
    ])
}

#[tokio::test]
async fn nested_composite_and_array() {
    let registry = TypeRegistry::with_builtins();
    // dependant type registered before its field type
    let person_decoder = registry.register_composite(person());
    registry.register_composite(address());

    let mut bytes = composite(&[
        (oid::VARCHAR, Some(Bytes::from_static(b"Budi"))),
        (ADDRESS, Some(home())),
        (oid::TEXT_ARRAY, Some(text_array(&["admin", "ops"]))),
        (oid::INT2, None),
    ]);
    let len = bytes.len();

    let record = person_decoder.decode_record(&mut bytes, len).await.unwrap();

    assert_eq!(record.keys().collect::<Vec<_>>(), ["name", "home", "tags"]);
    assert_eq!(record["name"].as_str(), Some("Budi"));

    let home = record["home"].as_record().unwrap();
    assert_eq!(home["street"].as_str(), Some("Jl. Sudirman"));
    assert_eq!(home["number"], Value::Int4(12));

    assert_eq!(
        record["tags"],
        Value::Array(vec![Some(Value::from("admin")), Some(Value::from("ops"))])
    );
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn nested_null_and_count_rules() {
    let registry = TypeRegistry::with_builtins();
    registry.register_composite(address());
    let person_decoder = registry.register_composite(person());

    // null inside nested value
    let inner = composite(&[(oid::TEXT, None), (oid::INT4, Some(Bytes::from_static(&[0, 0, 0, 1])))]);
    let mut bytes = composite(&[
        (oid::VARCHAR, None),
        (ADDRESS, Some(inner)),
        (oid::TEXT_ARRAY, None),
        (oid::INT2, Some(Bytes::from_static(&[0, 30]))),
    ]);
    let len = bytes.len();
    let record = person_decoder.decode_record(&mut bytes, len).await.unwrap();

    let expected: Record = [
        ("home", Value::Record(Record::from_iter([("number", 1)]))),
        ("age", Value::Int2(30)),
    ]
    .into_iter()
    .collect();
    assert_eq!(record, expected);

    // nested value with wrong field count
    let inner = composite(&[(oid::TEXT, None)]);
    let mut bytes = composite(&[
        (oid::VARCHAR, None),
        (ADDRESS, Some(inner)),
        (oid::TEXT_ARRAY, None),
        (oid::INT2, None),
    ]);
    let len = bytes.len();
    let err = person_decoder.decode_record(&mut bytes, len).await.unwrap_err();
    let ErrorKind::Protocol(ProtocolError::FieldCountMismatch { type_name, expected, actual }) = err.kind() else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(type_name, "public.address");
    assert_eq!((*expected, *actual), (2, 1));
}

#[tokio::test]
async fn wire_oid_is_not_verified() {
    let registry = TypeRegistry::with_builtins();
    let decoder = registry.register_composite(address());

    let mut bytes = composite(&[
        (oid::BOOL, Some(Bytes::from_static(b"Gang 7"))),
        (0, Some(Bytes::from_static(&[0, 0, 0, 3]))),
    ]);
    let len = bytes.len();
    let record = decoder.decode_record(&mut bytes, len).await.unwrap();

    assert_eq!(record["street"].as_str(), Some("Gang 7"));
    assert_eq!(record["number"], Value::Int4(3));
}

#[tokio::test]
async fn unknown_nested_type_until_registered() {
    let registry = TypeRegistry::with_builtins();
    let person_decoder = registry.register_composite(person());

    let value = composite(&[
        (oid::VARCHAR, Some(Bytes::from_static(b"Sari"))),
        (ADDRESS, None),
        (oid::TEXT_ARRAY, None),
        (oid::INT2, None),
    ]);

    for _ in 0..2 {
        let mut bytes = value.clone();
        let len = bytes.len();
        let err = person_decoder.decode_record(&mut bytes, len).await.unwrap_err();
        let ErrorKind::UnknownFieldType(e) = err.kind() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(e.field(), "home");
        assert_eq!(e.oid(), ADDRESS);
        assert_eq!(
            e.to_string(),
            "PostgreSQL composite type public.person has field home with an unknown type (TypeOID=16400)"
        );
        assert_eq!(person_decoder.state(), ResolveState::Unresolved);
    }

    registry.register_composite(address());

    let mut bytes = value.clone();
    let len = bytes.len();
    let record = person_decoder.decode_record(&mut bytes, len).await.unwrap();
    assert_eq!(record.len(), 1);
    assert_eq!(person_decoder.state(), ResolveState::Resolved);
}

#[tokio::test]
async fn decode_through_field_decoder() {
    let registry = TypeRegistry::with_builtins();
    let decoder: Arc<dyn FieldDecoder> = registry.register_composite(address());

    let mut bytes = home();
    let len = bytes.len();
    let value = decoder.decode(&mut bytes, len).await.unwrap();

    let record = value.into_record().unwrap();
    assert_eq!(record.len(), 2);
}

#[tokio::test]
async fn decode_from_buffered_reader() {
    use tokio::io::AsyncWriteExt;

    let registry = TypeRegistry::with_builtins();
    registry.register_composite(address());
    let person_decoder = registry.register_composite(person());

    let value = composite(&[
        (oid::VARCHAR, Some(Bytes::from_static(b"Ayu"))),
        (ADDRESS, Some(home())),
        (oid::TEXT_ARRAY, Some(text_array(&["x"]))),
        (oid::INT2, Some(Bytes::from_static(&[0, 41]))),
    ]);
    let len = value.len();

    let (mut tx, rx) = tokio::io::duplex(8);
    let mut reader = BufferedReader::with_capacity(16, rx);

    let writer = async move {
        for chunk in value.chunks(5) {
            tx.write_all(chunk).await.unwrap();
            tokio::task::yield_now().await;
        }
    };
    let read = person_decoder.decode_record(&mut reader, len);

    let ((), record) = tokio::join!(writer, read);
    let record = record.unwrap();

    assert_eq!(record["age"], Value::Int2(41));
    assert_eq!(record["home"].as_record().unwrap()["number"], Value::Int4(12));
    assert!(reader.buffer().is_empty());
}

#[tokio::test]
async fn truncated_value_is_io_error() {
    let registry = TypeRegistry::with_builtins();
    let decoder = registry.register_composite(address());

    let mut bytes = home().slice(..10);
    let err = decoder.decode_record(&mut bytes, 10).await.unwrap_err();
    let ErrorKind::Io(e) = err.kind() else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof);
}
