use vigil_dns_domain::is_valid_hostname;

#[test]
fn accepts_common_hostnames() {
    assert!(is_valid_hostname("example.com"));
    assert!(is_valid_hostname("www.example.com"));
    assert!(is_valid_hostname("a.b.c.d.e"));
    assert!(is_valid_hostname("xn--bcher-kva.example"));
    assert!(is_valid_hostname("host-1.internal"));
    assert!(is_valid_hostname("localhost"));
    assert!(is_valid_hostname("123.example"));
}

#[test]
fn rejects_empty_and_oversized() {
    assert!(!is_valid_hostname(""));

    let long_label = "a".repeat(64);
    assert!(!is_valid_hostname(&long_label));
    assert!(is_valid_hostname(&"a".repeat(63)));

    let mut oversized = String::new();
    while oversized.len() <= 253 {
        oversized.push_str("label.");
    }
    assert!(!is_valid_hostname(&oversized));
}

#[test]
fn rejects_bad_labels() {
    assert!(!is_valid_hostname("-leading.example"));
    assert!(!is_valid_hostname("trailing-.example"));
    assert!(!is_valid_hostname("double..dot"));
    assert!(!is_valid_hostname(".leading.dot"));
    assert!(!is_valid_hostname("trailing.dot."));
    assert!(!is_valid_hostname("under_score.example"));
    assert!(!is_valid_hostname("spa ce.example"));
}

#[test]
fn hyphen_allowed_only_inside() {
    assert!(is_valid_hostname("a-b.example"));
    assert!(is_valid_hostname("a--b.example"));
    assert!(!is_valid_hostname("-ab.example"));
    assert!(!is_valid_hostname("ab-.example"));
}
