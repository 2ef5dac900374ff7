//! Standard security handler
//!
//! Password-based PDF encryption as written by Acrobat and friends: RC4
//! (revisions 2 and 3), AES-128 (revision 4, `AESV2` crypt filters) and
//! AES-256 (revisions 5 and 6, `AESV3`). Both the user and the owner
//! password unlock a document.

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use lopdf::{Dictionary, Document, Object, ObjectId};
use md5::Md5;
use sha2::{Digest, Sha256, Sha384, Sha512};
use thiserror::Error;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub(crate) const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("the supplied password is incorrect")]
    IncorrectPassword,
    #[error("unsupported encryption: {0}")]
    Unsupported(String),
    #[error("malformed encryption dictionary: {0}")]
    Malformed(String),
    #[error("cannot decrypt object {id:?}: {reason}")]
    Object { id: ObjectId, reason: String },
}

/// How strings or streams are ciphered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CryptMethod {
    Identity,
    Rc4,
    AesV2,
    AesV3,
}

impl CryptMethod {
    fn from_name(name: &[u8]) -> Result<Self, SecurityError> {
        match name {
            b"None" | b"Identity" => Ok(Self::Identity),
            b"V2" => Ok(Self::Rc4),
            b"AESV2" => Ok(Self::AesV2),
            b"AESV3" => Ok(Self::AesV3),
            other => Err(SecurityError::Unsupported(format!(
                "crypt filter method {}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}

/// Parsed `Encrypt` dictionary of the `Standard` filter.
#[derive(Debug, Clone)]
pub(crate) struct StandardSecurity {
    pub(crate) revision: i64,
    pub(crate) key_length: usize,
    owner: Vec<u8>,
    user: Vec<u8>,
    owner_key: Vec<u8>,
    user_key: Vec<u8>,
    permissions: i32,
    file_id: Vec<u8>,
    encrypt_metadata: bool,
    streams: CryptMethod,
    strings: CryptMethod,
}

impl StandardSecurity {
    pub(crate) fn from_dictionary(dict: &Dictionary, file_id: Vec<u8>) -> Result<Self, SecurityError> {
        let filter = dict.get(b"Filter").and_then(Object::as_name).unwrap_or_default();
        if filter != b"Standard" {
            return Err(SecurityError::Unsupported(format!(
                "security handler {}",
                String::from_utf8_lossy(filter)
            )));
        }

        let version = dict.get(b"V").and_then(Object::as_i64).unwrap_or(0);
        let revision = dict
            .get(b"R")
            .and_then(Object::as_i64)
            .map_err(|_| SecurityError::Malformed("missing revision (R)".into()))?;

        let supported = matches!(
            (version, revision),
            (1 | 2, 2 | 3) | (4, 4) | (5, 5 | 6)
        );
        if !supported {
            return Err(SecurityError::Unsupported(format!("V {} R {}", version, revision)));
        }

        let (streams, strings) = if version >= 4 {
            (
                crypt_filter_method(dict, b"StmF")?,
                crypt_filter_method(dict, b"StrF")?,
            )
        } else {
            (CryptMethod::Rc4, CryptMethod::Rc4)
        };

        let declared_length = dict.get(b"Length").and_then(Object::as_i64).ok();
        let key_length = match (version, revision) {
            (5, _) => 32,
            (_, 2) => 5,
            (4, _) => declared_length.map_or(16, |bits| (bits / 8) as usize),
            _ => (declared_length.unwrap_or(40) / 8) as usize,
        };
        if revision <= 4 && !(5..=16).contains(&key_length) {
            return Err(SecurityError::Malformed(format!("key length of {} bytes", key_length)));
        }

        let entry = |key: &[u8]| -> Vec<u8> {
            dict.get(key)
                .and_then(Object::as_str)
                .map(<[u8]>::to_vec)
                .unwrap_or_default()
        };
        let owner = entry(b"O");
        let user = entry(b"U");
        let hash_len = if revision >= 5 { 48 } else { 32 };
        if owner.len() < hash_len || user.len() < hash_len {
            return Err(SecurityError::Malformed("O or U entry is missing or short".into()));
        }
        let owner_key = entry(b"OE");
        let user_key = entry(b"UE");
        if revision >= 5 && (owner_key.len() < 32 || user_key.len() < 32) {
            return Err(SecurityError::Malformed("OE or UE entry is missing or short".into()));
        }

        let permissions = dict
            .get(b"P")
            .and_then(Object::as_i64)
            .map_err(|_| SecurityError::Malformed("missing permissions (P)".into()))?
            as i32;
        if revision <= 4 && file_id.is_empty() {
            return Err(SecurityError::Malformed("missing file identifier (ID)".into()));
        }

        Ok(Self {
            revision,
            key_length,
            owner,
            user,
            owner_key,
            user_key,
            permissions,
            file_id,
            encrypt_metadata: dict
                .get(b"EncryptMetadata")
                .and_then(Object::as_bool)
                .unwrap_or(true),
            streams,
            strings,
        })
    }

    /// Returns the file key when `password` is the user or the owner password.
    pub(crate) fn authenticate(&self, password: &[u8]) -> Result<Vec<u8>, SecurityError> {
        let key = if self.revision >= 5 {
            self.aes256_file_key(password)?
        } else {
            self.legacy_user_key(password)
                .or_else(|| self.legacy_owner_key(password))
        };
        key.ok_or(SecurityError::IncorrectPassword)
    }

    fn legacy_user_key(&self, password: &[u8]) -> Option<Vec<u8>> {
        let key = self.legacy_file_key(password);
        let expected = self.user_entry(&key);
        let compared = if self.revision == 2 { 32 } else { 16 };
        (expected[..compared] == self.user[..compared]).then_some(key)
    }

    fn legacy_owner_key(&self, password: &[u8]) -> Option<Vec<u8>> {
        let key = self.owner_rc4_key(password);
        let mut user_password = self.owner[..32].to_vec();
        if self.revision == 2 {
            user_password = rc4(&key, &user_password);
        } else {
            for round in (0..20u8).rev() {
                user_password = rc4(&xor_key(&key, round), &user_password);
            }
        }
        self.legacy_user_key(&user_password)
    }

    /// File key of revisions 2 to 4, derived from a user password.
    pub(crate) fn legacy_file_key(&self, password: &[u8]) -> Vec<u8> {
        let mut md5 = Md5::new();
        md5.update(pad_password(password));
        md5.update(&self.owner[..32]);
        md5.update(self.permissions.to_le_bytes());
        md5.update(&self.file_id);
        if self.revision >= 4 && !self.encrypt_metadata {
            md5.update([0xFF; 4]);
        }
        let mut hash = md5.finalize().to_vec();
        if self.revision >= 3 {
            for _ in 0..50 {
                hash = Md5::digest(&hash[..self.key_length]).to_vec();
            }
        }
        hash.truncate(self.key_length);
        hash
    }

    /// Value of the `U` entry for a file key. From revision 3 on only the
    /// first 16 bytes are significant.
    pub(crate) fn user_entry(&self, key: &[u8]) -> Vec<u8> {
        if self.revision == 2 {
            return rc4(key, &PASSWORD_PADDING);
        }
        let mut md5 = Md5::new();
        md5.update(PASSWORD_PADDING);
        md5.update(&self.file_id);
        let mut hash = md5.finalize().to_vec();
        for round in 0..20u8 {
            hash = rc4(&xor_key(key, round), &hash);
        }
        hash.resize(32, 0);
        hash
    }

    /// RC4 key protecting the `O` entry.
    pub(crate) fn owner_rc4_key(&self, owner_password: &[u8]) -> Vec<u8> {
        let mut hash = Md5::digest(pad_password(owner_password)).to_vec();
        if self.revision >= 3 {
            for _ in 0..50 {
                hash = Md5::digest(&hash).to_vec();
            }
        }
        hash.truncate(self.key_length);
        hash
    }

    fn aes256_file_key(&self, password: &[u8]) -> Result<Option<Vec<u8>>, SecurityError> {
        let password = &password[..password.len().min(127)];
        let user = &self.user[..48];
        if self.hash(password, &user[32..40], &[])? == user[..32] {
            let key = self.hash(password, &user[40..48], &[])?;
            return unwrap_file_key(&key, &self.user_key[..32]).map(Some);
        }
        let owner = &self.owner[..48];
        if self.hash(password, &owner[32..40], user)? == owner[..32] {
            let key = self.hash(password, &owner[40..48], user)?;
            return unwrap_file_key(&key, &self.owner_key[..32]).map(Some);
        }
        Ok(None)
    }

    fn hash(&self, password: &[u8], salt: &[u8], user: &[u8]) -> Result<Vec<u8>, SecurityError> {
        if self.revision == 5 {
            let mut sha = Sha256::new();
            sha.update(password);
            sha.update(salt);
            sha.update(user);
            return Ok(sha.finalize().to_vec());
        }
        revision6_hash(password, salt, user)
    }

    pub(crate) fn object_key(&self, file_key: &[u8], method: CryptMethod, id: ObjectId) -> Vec<u8> {
        if method == CryptMethod::AesV3 {
            return file_key.to_vec();
        }
        let mut md5 = Md5::new();
        md5.update(file_key);
        md5.update(&id.0.to_le_bytes()[..3]);
        md5.update(&id.1.to_le_bytes()[..2]);
        if method == CryptMethod::AesV2 {
            md5.update(b"sAlT");
        }
        let hash = md5.finalize();
        hash[..(file_key.len() + 5).min(16)].to_vec()
    }

    fn decrypt_object(&self, file_key: &[u8], id: ObjectId, object: &mut Object) -> Result<(), SecurityError> {
        match object {
            Object::Stream(stream) => {
                if stream.dict.type_is(b"XRef") {
                    return Ok(());
                }
                if stream.dict.type_is(b"Metadata") && !self.encrypt_metadata {
                    return Ok(());
                }
                for (_, value) in stream.dict.iter_mut() {
                    self.decrypt_strings(file_key, id, value)?;
                }
                let key = self.object_key(file_key, self.streams, id);
                let plain = decrypt_bytes(self.streams, &key, &stream.content)
                    .map_err(|reason| SecurityError::Object { id, reason })?;
                stream.set_content(plain);
                Ok(())
            }
            other => self.decrypt_strings(file_key, id, other),
        }
    }

    fn decrypt_strings(&self, file_key: &[u8], id: ObjectId, object: &mut Object) -> Result<(), SecurityError> {
        match object {
            Object::String(bytes, _) => {
                let key = self.object_key(file_key, self.strings, id);
                *bytes = decrypt_bytes(self.strings, &key, bytes)
                    .map_err(|reason| SecurityError::Object { id, reason })?;
            }
            Object::Array(items) => {
                for item in items {
                    self.decrypt_strings(file_key, id, item)?;
                }
            }
            Object::Dictionary(dict) => {
                for (_, value) in dict.iter_mut() {
                    self.decrypt_strings(file_key, id, value)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Decrypts every string and stream in place and drops the `Encrypt` entry.
pub(crate) fn decrypt_document(doc: &mut Document, password: &str) -> Result<(), SecurityError> {
    let (encrypt_id, dict) = encryption_dictionary(doc)?;
    let security = StandardSecurity::from_dictionary(&dict, first_file_id(doc))?;
    let file_key = security.authenticate(password.as_bytes())?;
    log::debug!(
        "[Decrypt] standard handler R{} authenticated, {}-byte key",
        security.revision,
        file_key.len()
    );

    for (&id, object) in doc.objects.iter_mut() {
        if Some(id) == encrypt_id {
            continue;
        }
        security.decrypt_object(&file_key, id, object)?;
    }
    doc.trailer.remove(b"Encrypt");
    Ok(())
}

fn encryption_dictionary(doc: &Document) -> Result<(Option<ObjectId>, Dictionary), SecurityError> {
    match doc.trailer.get(b"Encrypt") {
        Ok(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .map(|dict| (Some(*id), dict.clone()))
            .map_err(|e| SecurityError::Malformed(e.to_string())),
        Ok(Object::Dictionary(dict)) => Ok((None, dict.clone())),
        _ => Err(SecurityError::Malformed("trailer has no Encrypt dictionary".into())),
    }
}

pub(crate) fn first_file_id(doc: &Document) -> Vec<u8> {
    doc.trailer
        .get(b"ID")
        .and_then(Object::as_array)
        .ok()
        .and_then(|ids| ids.first())
        .and_then(|id| id.as_str().ok())
        .map(<[u8]>::to_vec)
        .unwrap_or_default()
}

fn crypt_filter_method(dict: &Dictionary, entry: &[u8]) -> Result<CryptMethod, SecurityError> {
    let name = match dict.get(entry).and_then(Object::as_name) {
        Ok(name) => name,
        Err(_) => return Ok(CryptMethod::Identity),
    };
    if name == b"Identity" {
        return Ok(CryptMethod::Identity);
    }
    let method = dict
        .get(b"CF")
        .and_then(Object::as_dict)
        .and_then(|filters| filters.get(name))
        .and_then(Object::as_dict)
        .and_then(|filter| filter.get(b"CFM"))
        .and_then(Object::as_name)
        .map_err(|_| {
            SecurityError::Malformed(format!(
                "crypt filter {} is not defined",
                String::from_utf8_lossy(name)
            ))
        })?;
    CryptMethod::from_name(method)
}

fn decrypt_bytes(method: CryptMethod, key: &[u8], data: &[u8]) -> Result<Vec<u8>, String> {
    match method {
        CryptMethod::Identity => Ok(data.to_vec()),
        CryptMethod::Rc4 => Ok(rc4(key, data)),
        CryptMethod::AesV2 | CryptMethod::AesV3 => aes_decrypt(key, data),
    }
}

/// AES-CBC with the IV in the first block and PKCS#7 padding.
fn aes_decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, String> {
    if data.len() % 16 != 0 {
        return Err(format!("AES payload of {} bytes", data.len()));
    }
    if data.len() <= 16 {
        return Ok(Vec::new());
    }
    let (iv, body) = data.split_at(16);
    let plain = if key.len() == 16 {
        Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .decrypt_padded_vec_mut::<Pkcs7>(body)
    } else {
        Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|e| e.to_string())?
            .decrypt_padded_vec_mut::<Pkcs7>(body)
    };
    plain.map_err(|e| e.to_string())
}

fn unwrap_file_key(key: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, SecurityError> {
    Aes256CbcDec::new_from_slices(key, &[0u8; 16])
        .map_err(|e| SecurityError::Malformed(e.to_string()))?
        .decrypt_padded_vec_mut::<NoPadding>(wrapped)
        .map_err(|e| SecurityError::Malformed(e.to_string()))
}

/// Iterated SHA-2/AES hash of revision 6.
pub(crate) fn revision6_hash(password: &[u8], salt: &[u8], user: &[u8]) -> Result<Vec<u8>, SecurityError> {
    let mut sha = Sha256::new();
    sha.update(password);
    sha.update(salt);
    sha.update(user);
    let mut k = sha.finalize().to_vec();

    let mut round: u32 = 0;
    loop {
        let block = [password, k.as_slice(), user].concat();
        let k1 = block.repeat(64);
        let e = Aes128CbcEnc::new_from_slices(&k[..16], &k[16..32])
            .map_err(|e| SecurityError::Malformed(e.to_string()))?
            .encrypt_padded_vec_mut::<NoPadding>(&k1);

        let remainder = e[..16].iter().map(|b| u32::from(*b)).sum::<u32>() % 3;
        k = match remainder {
            0 => Sha256::digest(&e).to_vec(),
            1 => Sha384::digest(&e).to_vec(),
            _ => Sha512::digest(&e).to_vec(),
        };

        round += 1;
        let last = e.last().copied().map_or(0, u32::from);
        if round >= 64 && last <= round - 32 {
            break;
        }
    }
    k.truncate(32);
    Ok(k)
}

pub(crate) fn pad_password(password: &[u8]) -> [u8; 32] {
    let mut padded = PASSWORD_PADDING;
    let len = password.len().min(32);
    padded[..len].copy_from_slice(&password[..len]);
    padded[len..].copy_from_slice(&PASSWORD_PADDING[..32 - len]);
    padded
}

pub(crate) fn xor_key(key: &[u8], round: u8) -> Vec<u8> {
    key.iter().map(|b| b ^ round).collect()
}

pub(crate) fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut state: [u8; 256] = std::array::from_fn(|i| i as u8);
    let mut j: u8 = 0;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
        state.swap(i, usize::from(j));
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[usize::from(i)]);
            state.swap(usize::from(i), usize::from(j));
            let t = state[usize::from(i)].wrapping_add(state[usize::from(j)]);
            byte ^ state[usize::from(t)]
        })
        .collect()
}
