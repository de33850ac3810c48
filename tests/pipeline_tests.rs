//! End-to-end tests: classify, materialize, verify and annotate real
//! S/MIME messages signed with throwaway certificates.

mod common;

use assert_fs::prelude::*;
use predicates::prelude::*;

use smimecheck::model::header_output::{HeaderDisplay, HeaderOutput};
use smimecheck::model::message::MessageUid;
use smimecheck::model::verification::{Classification, Verdict, VerificationState};
use smimecheck::parser::mime::parse_message;
use smimecheck::smime::annotate::SMIME_HEADER_KEY;
use smimecheck::smime::{classify_message, verify, Smime, TrustConfiguration};
use smimecheck::store::eml::EmlDirStore;
use smimecheck::store::mbox::MboxStore;
use smimecheck::store::MailStore;

use common::*;

fn viewer_headers() -> HeaderOutput {
    let mut output = HeaderOutput::new();
    output.insert("from".into(), HeaderDisplay::text("From", "Alice <alice@example.com>"));
    output.insert("subject".into(), HeaderDisplay::text("Subject", "Invoice approval"));
    output
}

// ─── Scenario A: trusted signer ─────────────────────────────────────

#[test]
fn test_trusted_signature_is_validated() {
    let tmp = tempfile::tempdir().unwrap();
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let bundle = ca.write_pem(&tmp.path().join("ca.pem"));

    let artifacts = tempfile::tempdir().unwrap();
    let smime = Smime::new(TrustConfiguration::new([bundle])).with_temp_dir(artifacts.path());
    let mut store = CountingStore::default();
    store.inner.insert("1", signed_message(&alice));

    let raw = signed_message(&alice);
    let message = parse_message("1", &raw);
    let mut cycle = smime.cycle(&store);
    cycle.on_message_load(&message);
    assert_eq!(cycle.state(), VerificationState::SignedValid);

    let output = cycle.on_headers_output(viewer_headers());
    assert_eq!(output.len(), 3);
    let row = &output[SMIME_HEADER_KEY];
    assert_eq!(row.title, "S/Mime");
    assert!(row.html);
    assert!(predicate::str::contains("alt=\"validated\"").eval(&row.value));
    assert!(predicate::str::starts_with("<img src=\"data:image/png;base64,").eval(&row.value));

    assert_eq!(store.reads(), 1);
    assert_eq!(dir_entries(artifacts.path()), 0);
}

// ─── Scenario B: untrusted signer ───────────────────────────────────

#[test]
fn test_untrusted_signature_is_invalid() {
    let tmp = tempfile::tempdir().unwrap();
    let trusted = certificate_authority("Example Root");
    let rogue = certificate_authority("Rogue Root");
    let mallory = signer(&rogue, "mallory@example.net");
    let bundle = trusted.write_pem(&tmp.path().join("ca.pem"));

    let smime = Smime::new(TrustConfiguration::new([bundle]));
    let mut store = CountingStore::default();
    let raw = signed_message(&mallory);
    store.inner.insert("1", raw.clone());

    let mut cycle = smime.cycle(&store);
    cycle.on_message_load(&parse_message("1", &raw));
    assert_eq!(cycle.state(), VerificationState::SignedInvalid);

    let output = cycle.on_headers_output(viewer_headers());
    let row = &output[SMIME_HEADER_KEY];
    assert!(predicate::str::contains("alt=\"invalid\"").eval(&row.value));
    assert_eq!(store.reads(), 1);
}

// ─── Scenario C: unsigned message ───────────────────────────────────

#[test]
fn test_unsigned_message_is_untouched() {
    let artifacts = tempfile::tempdir().unwrap();
    let smime = Smime::new(TrustConfiguration::empty()).with_temp_dir(artifacts.path());
    let mut store = CountingStore::default();
    store.inner.insert("1", plain_message());

    let mut cycle = smime.cycle(&store);
    cycle.on_message_load(&parse_message("1", &plain_message()));
    assert_eq!(cycle.state(), VerificationState::NotSigned);
    assert_eq!(cycle.on_headers_output(viewer_headers()), viewer_headers());

    assert_eq!(store.reads(), 0);
    assert_eq!(dir_entries(artifacts.path()), 0);
}

#[test]
fn test_legacy_signature_type_is_not_verified() {
    let tmp = tempfile::tempdir().unwrap();
    let artifacts = tempfile::tempdir().unwrap();
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let smime = Smime::new(TrustConfiguration::new([ca.write_pem(&tmp.path().join("ca.pem"))]))
        .with_temp_dir(artifacts.path());

    let raw = legacy_signed_message(&alice);
    let message = parse_message("1", &raw);
    let root = message.structure.as_ref().unwrap();
    assert!(root.parts[1].is("application/x-pkcs7-signature"));
    assert_eq!(classify_message(&message), Classification::NotSigned);

    let mut store = CountingStore::default();
    store.inner.insert("1", raw);
    let mut cycle = smime.cycle(&store);
    cycle.on_message_load(&message);
    assert_eq!(cycle.state(), VerificationState::NotSigned);
    assert_eq!(cycle.on_headers_output(viewer_headers()), viewer_headers());
    assert_eq!(store.reads(), 0);
    assert_eq!(dir_entries(artifacts.path()), 0);
}

#[test]
fn test_fixture_signature_part_is_recognized() {
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let message = parse_message("1", &signed_message(&alice));
    assert_eq!(classify_message(&message), Classification::CandidateSigned);
}

// ─── Trust configuration ────────────────────────────────────────────

#[test]
fn test_empty_trust_rejects_every_signer() {
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let raw = signed_message(&alice);

    let smime = Smime::new(TrustConfiguration::empty());
    let mut store = CountingStore::default();
    store.inner.insert("1", raw.clone());

    assert_eq!(
        smime.classify_and_verify(&parse_message("1", &raw), &store),
        VerificationState::SignedInvalid
    );
}

#[test]
fn test_hashed_directory_anchor() {
    let anchors = assert_fs::TempDir::new().unwrap();
    let ca = certificate_authority("Directory Root");
    hashed_dir(&ca, anchors.path());
    let alice = signer(&ca, "alice@example.com");
    let raw = signed_message(&alice);

    let artifact = assert_fs::NamedTempFile::new("signed.eml").unwrap();
    artifact.write_binary(&raw).unwrap();

    let trust = TrustConfiguration::new([anchors.path()]);
    assert_eq!(verify(artifact.path(), &trust), Verdict::Valid);
}

#[test]
fn test_second_bundle_still_trusted() {
    let tmp = tempfile::tempdir().unwrap();
    let other = certificate_authority("Other Root");
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let first = other.write_pem(&tmp.path().join("other.pem"));
    let second = ca.write_pem(&tmp.path().join("ca.pem"));

    let artifact = tmp.path().join("signed.eml");
    std::fs::write(&artifact, signed_message(&alice)).unwrap();

    assert_eq!(
        verify(&artifact, &TrustConfiguration::new([first, second])),
        Verdict::Valid
    );
}

#[test]
fn test_unreadable_bundle_rejects_signature() {
    let tmp = tempfile::tempdir().unwrap();
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let good = ca.write_pem(&tmp.path().join("ca.pem"));

    let artifact = tmp.path().join("signed.eml");
    std::fs::write(&artifact, signed_message(&alice)).unwrap();

    let trust = TrustConfiguration::new([good, tmp.path().join("missing.pem")]);
    assert_eq!(verify(&artifact, &trust), Verdict::Invalid);
}

// ─── Integrity ──────────────────────────────────────────────────────

#[test]
fn test_tampered_body_is_invalid() {
    let tmp = tempfile::tempdir().unwrap();
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let trust = TrustConfiguration::new([ca.write_pem(&tmp.path().join("ca.pem"))]);

    let raw = signed_message(&alice);
    let good = tmp.path().join("good.eml");
    let bad = tmp.path().join("bad.eml");
    std::fs::write(&good, &raw).unwrap();
    std::fs::write(&bad, tamper(&raw)).unwrap();

    assert_eq!(verify(&good, &trust), Verdict::Valid);
    assert_eq!(verify(&bad, &trust), Verdict::Invalid);
}

#[test]
fn test_one_artifact_per_verification() {
    let tmp = tempfile::tempdir().unwrap();
    let artifacts = tempfile::tempdir().unwrap();
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let smime = Smime::new(TrustConfiguration::new([ca.write_pem(&tmp.path().join("ca.pem"))]))
        .with_temp_dir(artifacts.path());

    let raw = signed_message(&alice);
    let mut store = CountingStore::default();
    store.inner.insert("good", raw.clone());
    store.inner.insert("bad", tamper(&raw));

    let message = parse_message("good", &raw);
    let tampered = parse_message("bad", &tamper(&raw));
    for _ in 0..3 {
        assert_eq!(
            smime.classify_and_verify(&message, &store),
            VerificationState::SignedValid
        );
        assert_eq!(
            smime.classify_and_verify(&tampered, &store),
            VerificationState::SignedInvalid
        );
    }
    assert_eq!(store.reads(), 6);
    assert_eq!(dir_entries(artifacts.path()), 0);
}

#[test]
fn test_missing_raw_body_stays_pending() {
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let raw = signed_message(&alice);

    let smime = Smime::new(TrustConfiguration::empty());
    let store = CountingStore::default();
    let mut cycle = smime.cycle(&store);
    cycle.on_message_load(&parse_message("gone", &raw));

    assert_eq!(cycle.state(), VerificationState::SignedPendingVerification);
    let output = cycle.on_headers_output(HeaderOutput::new());
    assert!(predicate::str::contains("alt=\"invalid\"").eval(&output[SMIME_HEADER_KEY].value));
}

// ─── Stores ─────────────────────────────────────────────────────────

#[test]
fn test_mbox_store_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let smime = Smime::new(TrustConfiguration::new([ca.write_pem(&tmp.path().join("ca.pem"))]));

    let mut mbox = b"From alice@example.com Tue Oct 13 09:30:00 2026\n".to_vec();
    mbox.extend_from_slice(&signed_message(&alice));
    mbox.extend_from_slice(b"\nFrom carol@example.com Wed Oct 14 12:00:00 2026\n");
    mbox.extend_from_slice(&plain_message());
    let path = tmp.path().join("inbox.mbox");
    std::fs::write(&path, &mbox).unwrap();

    let store = MboxStore::open(&path, None).unwrap();
    let uids = store.uids().unwrap();
    assert_eq!(uids, vec![MessageUid::from("0"), MessageUid::from("1")]);

    let mut cycle = smime.cycle(&store);
    let mut states = Vec::new();
    for uid in &uids {
        let message = store.load_message(uid).unwrap();
        cycle.on_message_load(&message);
        states.push(cycle.state());
    }
    assert_eq!(
        states,
        vec![VerificationState::SignedValid, VerificationState::NotSigned]
    );
}

#[test]
fn test_eml_directory_end_to_end() {
    let dir = assert_fs::TempDir::new().unwrap();
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let bundle = dir.child("anchors").child("ca.pem");
    bundle.write_binary(&ca.cert.to_pem().unwrap()).unwrap();

    let mail = dir.child("mail");
    mail.child("signed.eml").write_binary(&signed_message(&alice)).unwrap();
    mail.child("plain.eml").write_binary(&plain_message()).unwrap();
    mail.child("notes.txt").write_str("ignored").unwrap();

    let store = EmlDirStore::open(mail.path()).unwrap();
    assert_eq!(
        store.uids().unwrap(),
        vec![MessageUid::from("plain"), MessageUid::from("signed")]
    );

    let smime = Smime::new(TrustConfiguration::new([bundle.path()]));
    let signed = store.load_message(&"signed".into()).unwrap();
    let plain = store.load_message(&"plain".into()).unwrap();
    assert_eq!(
        smime.classify_and_verify(&signed, &store),
        VerificationState::SignedValid
    );
    assert_eq!(
        smime.classify_and_verify(&plain, &store),
        VerificationState::NotSigned
    );
}

#[test]
fn test_shared_across_threads() {
    let tmp = tempfile::tempdir().unwrap();
    let ca = certificate_authority("Example Root");
    let alice = signer(&ca, "alice@example.com");
    let smime = Smime::new(TrustConfiguration::new([ca.write_pem(&tmp.path().join("ca.pem"))]));
    let raw = signed_message(&alice);

    std::thread::scope(|scope| {
        for i in 0..4 {
            let smime = &smime;
            let raw = &raw;
            scope.spawn(move || {
                let mut store = smimecheck::store::memory::MemoryStore::new();
                let uid = format!("m{i}");
                store.insert(uid.as_str(), raw.clone());
                let message = parse_message(uid.as_str(), raw);
                assert_eq!(
                    smime.classify_and_verify(&message, &store),
                    VerificationState::SignedValid
                );
            });
        }
    });
}
