use super::*;

#[test]
fn write_read_round_trip() {
    let path = "test.obj";

    let program_orig = Program::from(vec![0x8401, 0x0000, 0x1234, 0xFFFF]);

    write_file(path, &program_orig).unwrap();
    let program_read = read_file(path).unwrap();

    assert_eq!(program_orig, program_read);

    std::fs::remove_file(path).unwrap();
}

#[test]
fn written_bytes_are_big_endian() {
    let mut buf = Vec::new();
    write(&mut buf, &Program::from(vec![0x1234])).unwrap();
    assert_eq!(buf, vec![0x12, 0x34]);
}

#[test]
fn empty_program_round_trips() {
    let mut buf = Vec::new();
    write(&mut buf, &Program::from(Vec::new())).unwrap();
    let program = read(&mut buf.as_slice()).unwrap();
    assert!(program.words().is_empty());
}

#[test]
fn trailing_odd_byte_is_rejected() {
    let buf: Vec<u8> = vec![0x12, 0x34, 0x56];
    let err = read(&mut buf.as_slice()).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
}
