//! Certificate authorities, signers and signed messages for integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::io::Write;
use std::path::{Path, PathBuf};

use openssl::asn1::{Asn1Integer, Asn1Time};
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::stack::Stack;
use openssl::x509::extension::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName, SubjectKeyIdentifier,
};
use openssl::x509::{X509Builder, X509Name, X509NameBuilder, X509};

use smimecheck::error::Result;
use smimecheck::model::message::MessageUid;
use smimecheck::store::memory::MemoryStore;
use smimecheck::store::MailStore;

pub const SIGNED_TEXT: &str = "Please approve the attached invoice by Friday.\nThanks, Alice\n";

/// A certificate with its private key.
pub struct Identity {
    pub cert: X509,
    pub key: PKey<Private>,
}

impl Identity {
    /// Write the certificate as a single-entry PEM bundle.
    pub fn write_pem(&self, path: &Path) -> PathBuf {
        std::fs::write(path, self.cert.to_pem().unwrap()).unwrap();
        path.to_path_buf()
    }
}

fn name(common_name: &str) -> X509Name {
    let mut builder = X509NameBuilder::new().unwrap();
    builder.append_entry_by_text("O", "smimecheck tests").unwrap();
    builder.append_entry_by_text("CN", common_name).unwrap();
    builder.build()
}

fn serial() -> Asn1Integer {
    let mut bn = BigNum::new().unwrap();
    bn.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    bn.to_asn1_integer().unwrap()
}

fn base_builder(subject: &X509Name, key: &PKey<Private>) -> X509Builder {
    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    builder.set_serial_number(&serial()).unwrap();
    builder.set_subject_name(subject).unwrap();
    builder.set_pubkey(key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    builder
}

fn new_key() -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
}

/// A self-signed root allowed to issue certificates.
pub fn certificate_authority(common_name: &str) -> Identity {
    let key = new_key();
    let subject = name(common_name);
    let mut builder = base_builder(&subject, &key);
    builder.set_issuer_name(&subject).unwrap();
    builder
        .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
        .unwrap();
    builder
        .append_extension(
            KeyUsage::new()
                .critical()
                .key_cert_sign()
                .crl_sign()
                .build()
                .unwrap(),
        )
        .unwrap();
    let ski = SubjectKeyIdentifier::new()
        .build(&builder.x509v3_context(None, None))
        .unwrap();
    builder.append_extension(ski).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();

    Identity {
        cert: builder.build(),
        key,
    }
}

/// An end-entity S/MIME signing certificate issued by `ca`.
pub fn signer(ca: &Identity, email: &str) -> Identity {
    let key = new_key();
    let subject = name(email);
    let mut builder = base_builder(&subject, &key);
    builder.set_issuer_name(ca.cert.subject_name()).unwrap();
    builder
        .append_extension(BasicConstraints::new().build().unwrap())
        .unwrap();
    builder
        .append_extension(
            KeyUsage::new()
                .critical()
                .digital_signature()
                .non_repudiation()
                .build()
                .unwrap(),
        )
        .unwrap();
    builder
        .append_extension(ExtendedKeyUsage::new().email_protection().build().unwrap())
        .unwrap();
    let san = SubjectAlternativeName::new()
        .email(email)
        .build(&builder.x509v3_context(Some(&ca.cert), None))
        .unwrap();
    builder.append_extension(san).unwrap();
    builder.sign(&ca.key, MessageDigest::sha256()).unwrap();

    Identity {
        cert: builder.build(),
        key,
    }
}

const HEADERS: &[u8] = b"From: Alice <alice@example.com>\n\
To: Bob <bob@example.com>\n\
Subject: Invoice approval\n\
Date: Tue, 13 Oct 2026 09:30:00 +0000\n\
Message-ID: <invoice-1@example.com>\n";

/// A complete message exactly as `openssl smime -sign` writes it, signature
/// part typed `application/x-pkcs7-signature`.
pub fn legacy_signed_message(signer: &Identity) -> Vec<u8> {
    let flags = Pkcs7Flags::DETACHED | Pkcs7Flags::TEXT;
    let extra = Stack::<X509>::new().unwrap();
    let pkcs7 = Pkcs7::sign(
        &signer.cert,
        &signer.key,
        &extra,
        SIGNED_TEXT.as_bytes(),
        flags,
    )
    .unwrap();
    let body = pkcs7.to_smime(SIGNED_TEXT.as_bytes(), flags).unwrap();

    let mut raw = HEADERS.to_vec();
    raw.extend_from_slice(&body);
    raw
}

/// A complete RFC 5322 message whose body is a detached S/MIME signature
/// over [`SIGNED_TEXT`], signature part typed `application/pkcs7-signature`.
///
/// Only MIME headers outside the signed first part are rewritten.
pub fn signed_message(signer: &Identity) -> Vec<u8> {
    let raw = String::from_utf8(legacy_signed_message(signer)).unwrap();
    let raw = raw.replace("application/x-pkcs7-signature", "application/pkcs7-signature");
    assert!(raw.contains("Content-Type: application/pkcs7-signature"));
    raw.into_bytes()
}

/// A plain, unsigned message.
pub fn plain_message() -> Vec<u8> {
    b"From: Carol <carol@example.com>\n\
To: Bob <bob@example.com>\n\
Subject: Lunch\n\
Date: Wed, 14 Oct 2026 12:00:00 +0000\n\
Content-Type: text/plain; charset=utf-8\n\
\n\
Noon at the usual place?\n"
        .to_vec()
}

/// Change one byte of the signed text.
pub fn tamper(raw: &[u8]) -> Vec<u8> {
    let needle = b"invoice by Friday";
    let pos = raw
        .windows(needle.len())
        .position(|w| w == needle)
        .expect("signed text present");
    let mut out = raw.to_vec();
    out[pos] = b'I';
    out
}

/// Write a hashed certificate directory (`<subject hash>.0`) holding `ca`.
pub fn hashed_dir(ca: &Identity, dir: &Path) {
    let file = dir.join(format!("{:08x}.0", ca.cert.subject_name_hash()));
    std::fs::write(file, ca.cert.to_pem().unwrap()).unwrap();
}

/// Number of entries in `dir`.
pub fn dir_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// A [`MemoryStore`] that counts raw-body reads.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    reads: Cell<usize>,
}

impl CountingStore {
    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl MailStore for CountingStore {
    fn write_raw_body(&self, uid: &MessageUid, sink: &mut dyn Write) -> Result<u64> {
        self.reads.set(self.reads.get() + 1);
        self.inner.write_raw_body(uid, sink)
    }

    fn uids(&self) -> Result<Vec<MessageUid>> {
        self.inner.uids()
    }
}
