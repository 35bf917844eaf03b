//! Address and account encoding helpers shared by the encryptor and
//! decryptor.

pub mod address;
