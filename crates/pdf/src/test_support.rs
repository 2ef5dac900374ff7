//! In-memory PDF fixtures for tests.

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockEncryptMut, KeyIvInit};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::security::{
    first_file_id, pad_password, rc4, revision6_hash, xor_key, CryptMethod, StandardSecurity,
};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

const FILE_ID: &[u8; 16] = b"guardian-fixture";

/// One page per entry, each drawing the given line of text.
pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
    save(build_document(text_contents(pages)))
}

fn text_contents(pages: &[&str]) -> Vec<Content> {
    pages
        .iter()
        .map(|line| Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        })
        .collect()
}

/// A text page whose `Identity-H` font lacks the `ToUnicode` map needed to
/// decode it.
pub fn undecodable_font_pdf() -> Vec<u8> {
    let mut doc = build_document(text_contents(&["Hidden 555-12-3456"]));
    let font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "Missing-Identity",
        "Encoding" => "Identity-H",
    });
    replace_font(&mut doc, font);
    save(doc)
}

/// A text page whose font resource `F1` points at a plain data stream.
pub fn stream_as_font_pdf() -> Vec<u8> {
    let mut doc = build_document(text_contents(&["Hidden 555-12-3456"]));
    let font = doc.add_object(Stream::new(dictionary! {}, b"not a font".to_vec()));
    replace_font(&mut doc, font);
    save(doc)
}

fn replace_font(doc: &mut Document, font: ObjectId) {
    for object in doc.objects.values_mut() {
        if let Ok(resources) = object.as_dict_mut() {
            if resources.has(b"Font") {
                resources.set("Font", dictionary! { "F1" => font });
            }
        }
    }
}

/// Password-protected variants produced by the standard security handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfCipher {
    /// 128-bit RC4, revision 3.
    Rc4,
    /// AES-128 crypt filters, revision 4.
    Aes128,
    /// AES-256 crypt filters, revision 6.
    Aes256,
}

/// A text PDF encrypted for `user_password` and `owner_password`.
pub fn encrypted_pdf(
    pages: &[&str],
    cipher: PdfCipher,
    user_password: &str,
    owner_password: &str,
) -> Vec<u8> {
    let mut doc = build_document(text_contents(pages));
    let file_id = Object::String(FILE_ID.to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);

    let (dict, file_key, method) = match cipher {
        PdfCipher::Rc4 => legacy_encryption(&doc, 2, 3, None, user_password, owner_password),
        PdfCipher::Aes128 => legacy_encryption(
            &doc,
            4,
            4,
            Some(CryptMethod::AesV2),
            user_password,
            owner_password,
        ),
        PdfCipher::Aes256 => aes256_encryption(user_password, owner_password),
    };
    let security = StandardSecurity::from_dictionary(&dict, first_file_id(&doc))
        .expect("fixture encryption dictionary");

    for (&id, object) in doc.objects.iter_mut() {
        encrypt_object(&security, &file_key, method, id, object);
    }
    let encrypt_id = doc.add_object(dict);
    doc.trailer.set("Encrypt", encrypt_id);
    save(doc)
}

fn hex(bytes: &[u8]) -> Object {
    Object::String(bytes.to_vec(), StringFormat::Hexadecimal)
}

fn crypt_filters(method: &str, length: i64) -> Dictionary {
    dictionary! {
        "StdCF" => dictionary! {
            "Type" => "CryptFilter",
            "CFM" => method,
            "AuthEvent" => "DocOpen",
            "Length" => length,
        },
    }
}

fn legacy_encryption(
    doc: &Document,
    version: i64,
    revision: i64,
    aes: Option<CryptMethod>,
    user_password: &str,
    owner_password: &str,
) -> (Dictionary, Vec<u8>, CryptMethod) {
    let mut dict = dictionary! {
        "Filter" => "Standard",
        "V" => version,
        "R" => revision,
        "Length" => 128,
        "P" => -4,
        "O" => hex(&[0u8; 32]),
        "U" => hex(&[0u8; 32]),
    };
    if aes.is_some() {
        dict.set("CF", crypt_filters("AESV2", 16));
        dict.set("StmF", "StdCF");
        dict.set("StrF", "StdCF");
    }

    let security = StandardSecurity::from_dictionary(&dict, first_file_id(doc))
        .expect("fixture encryption dictionary");
    let owner_key = security.owner_rc4_key(owner_password.as_bytes());
    let mut owner_entry = pad_password(user_password.as_bytes()).to_vec();
    for round in 0..20u8 {
        owner_entry = rc4(&xor_key(&owner_key, round), &owner_entry);
    }
    dict.set("O", hex(&owner_entry));

    let security = StandardSecurity::from_dictionary(&dict, first_file_id(doc))
        .expect("fixture encryption dictionary");
    let file_key = security.legacy_file_key(user_password.as_bytes());
    dict.set("U", hex(&security.user_entry(&file_key)));
    (dict, file_key, aes.unwrap_or(CryptMethod::Rc4))
}

fn aes256_encryption(user_password: &str, owner_password: &str) -> (Dictionary, Vec<u8>, CryptMethod) {
    let file_key = [0x5Au8; 32];
    let hash = |password: &str, salt: &[u8], user: &[u8]| {
        revision6_hash(password.as_bytes(), salt, user).expect("revision 6 hash")
    };
    let wrap = |key: &[u8]| {
        Aes256CbcEnc::new_from_slices(key, &[0u8; 16])
            .expect("key and iv sizes")
            .encrypt_padded_vec_mut::<NoPadding>(&file_key)
    };

    let user = [hash(user_password, b"uvalsalt", &[]), b"uvalsalt".to_vec(), b"ukeysalt".to_vec()].concat();
    let user_wrapped = wrap(&hash(user_password, b"ukeysalt", &[]));
    let owner = [
        hash(owner_password, b"ovalsalt", &user),
        b"ovalsalt".to_vec(),
        b"okeysalt".to_vec(),
    ]
    .concat();
    let owner_wrapped = wrap(&hash(owner_password, b"okeysalt", &user));

    let dict = dictionary! {
        "Filter" => "Standard",
        "V" => 5,
        "R" => 6,
        "Length" => 256,
        "P" => -4,
        "O" => hex(&owner),
        "U" => hex(&user),
        "OE" => hex(&owner_wrapped),
        "UE" => hex(&user_wrapped),
        "CF" => crypt_filters("AESV3", 32),
        "StmF" => "StdCF",
        "StrF" => "StdCF",
    };
    (dict, file_key.to_vec(), CryptMethod::AesV3)
}

fn encrypt_object(
    security: &StandardSecurity,
    file_key: &[u8],
    method: CryptMethod,
    id: ObjectId,
    object: &mut Object,
) {
    let key = security.object_key(file_key, method, id);
    let seal = |plain: &[u8]| -> Vec<u8> {
        match method {
            CryptMethod::Identity => plain.to_vec(),
            CryptMethod::Rc4 => rc4(&key, plain),
            CryptMethod::AesV2 | CryptMethod::AesV3 => {
                let iv = [id.0 as u8; 16];
                let body = if key.len() == 16 {
                    Aes128CbcEnc::new_from_slices(&key, &iv)
                        .expect("key and iv sizes")
                        .encrypt_padded_vec_mut::<Pkcs7>(plain)
                } else {
                    Aes256CbcEnc::new_from_slices(&key, &iv)
                        .expect("key and iv sizes")
                        .encrypt_padded_vec_mut::<Pkcs7>(plain)
                };
                [iv.as_slice(), body.as_slice()].concat()
            }
        }
    };
    match object {
        Object::Stream(stream) => {
            let sealed = seal(&stream.content);
            stream.set_content(sealed);
        }
        Object::String(bytes, _) => *bytes = seal(bytes.as_slice()),
        _ => {}
    }
}

/// A single page that only paints an image, like a scan.
pub fn image_only_pdf() -> Vec<u8> {
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![595.into(), 0.into(), 0.into(), 842.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec!["Im1".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    save(build_document(vec![content]))
}

/// A text document whose trailer declares encryption without any keys.
pub fn encrypted_marker_document() -> Document {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Tj", vec![Object::string_literal("secret")]),
            Operation::new("ET", vec![]),
        ],
    };
    let mut doc = build_document(vec![content]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    doc
}

fn build_document(page_contents: Vec<Content>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0u8],
    ));
    let mut xobjects = Dictionary::new();
    xobjects.set("Im1", image_id);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => xobjects,
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in page_contents {
        let data = content.encode().expect("encode content stream");
        let content_id = doc.add_object(Stream::new(dictionary! {}, data));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save pdf");
    out
}
