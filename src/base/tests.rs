use crate::base::neterror::NetError;

#[test]
fn test_connect_classification() {
    assert!(NetError::ConnectionFailed.is_connect());
    assert!(NetError::dns_failed(
        "itch.io",
        std::io::Error::new(std::io::ErrorKind::NotFound, "nx")
    )
    .is_connect());

    assert!(!NetError::HttpBodyError.is_connect());
    assert!(!NetError::TooManyRedirects.is_connect());
}

#[test]
fn test_status_accessor() {
    let err = NetError::HttpStatus {
        status: 503,
        url: "https://api.itch.io/profile/collections".into(),
    };
    assert_eq!(err.status(), Some(503));
    assert_eq!(NetError::ConnectionFailed.status(), None);
}

#[test]
fn test_dns_failure_message_names_domain() {
    let err = NetError::dns_failed(
        "loop-io.dev",
        std::io::Error::new(std::io::ErrorKind::Other, "all strategies failed"),
    );
    let msg = err.to_string();
    assert!(msg.contains("loop-io.dev"));
    assert!(msg.contains("all strategies failed"));
}

#[test]
fn test_connection_failure_names_endpoint() {
    let err = NetError::connection_failed_to(
        "itch.io",
        443,
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
    );

    match &err {
        NetError::ConnectionFailedTo { host, port, .. } => {
            assert_eq!(host, "itch.io");
            assert_eq!(*port, 443);
        }
        other => panic!("expected ConnectionFailedTo, got {other:?}"),
    }
    assert!(err.is_connect());
    assert!(err.to_string().contains("itch.io:443"));
}
