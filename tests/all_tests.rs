#![allow(bad_style)]

mod decode;

fn rand_bytes(len: usize) -> Vec<u8> {
  let mut v = vec![0; len];
  getrandom::getrandom(&mut v).unwrap();
  v
}
