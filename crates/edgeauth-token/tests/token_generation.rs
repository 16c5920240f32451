//! End-to-end token generation against independently computed vectors.

use edgeauth_token::{
    Algorithm, FixedClock, GenerationRequest, StartTime, TokenConfig, TokenError, TokenGenerator,
};

const KEY: &str = "abcdef0123456789";
const TRANSITION_KEY: &str = "0123456789abcdef0123456789abcdef";
const NOW: i64 = 1_700_000_000;
const DEFAULT_WINDOW_SECONDS: i64 = 500;

fn generator(config: TokenConfig) -> TokenGenerator {
    TokenGenerator::new(config)
        .expect("valid test config")
        .with_clock(FixedClock(NOW))
}

fn url_request(url: &str) -> GenerationRequest {
    GenerationRequest::builder().url(url).build()
}

#[test]
fn test_should_generate_full_acl_token_vector() {
    let config = TokenConfig::builder()
        .key(KEY)
        .algorithm(Algorithm::Sha1)
        .salt("pepper")
        .start_time(StartTime::Now)
        .window_seconds(DEFAULT_WINDOW_SECONDS)
        .ip("192.168.0.1")
        .session_id("session-1")
        .payload("SOME_PAYLOAD_DATA")
        .build();

    let token = generator(config).generate_acl_token(["/a", "/a/*"]).unwrap();

    assert_eq!(
        token.as_str(),
        "ip=192.168.0.1~st=1700000000~exp=1700000500~acl=/a!/a/*~id=session-1\
         ~data=SOME_PAYLOAD_DATA~hmac=f29d50119c0016609db46bbd9cafdf78a785849d"
    );
}

#[test]
fn test_should_generate_escape_early_url_token_vector() {
    let config = TokenConfig::builder()
        .key(KEY)
        .algorithm(Algorithm::Md5)
        .window_seconds(DEFAULT_WINDOW_SECONDS)
        .escape_early(true)
        .build();

    let request = GenerationRequest::builder()
        .url("/search?q=hello world")
        .session_id("a b")
        .payload("x/y")
        .build();
    let token = generator(config).generate(&request).unwrap();

    assert_eq!(
        token.as_str(),
        "exp=1700000500~id=a%20b~data=x%2fy~hmac=35cb0671fe25d3b7cc1b7f8159419830"
    );
}

#[test]
fn test_should_honor_custom_field_delimiter() {
    let config = TokenConfig::builder()
        .key(KEY)
        .field_delimiter(";")
        .start_time(StartTime::At(1000))
        .end_time(2000)
        .build();

    let token = generator(config).generate_url_token("/path").unwrap();

    assert_eq!(
        token.as_str(),
        "st=1000;exp=2000;hmac=5a9af0ae5603ad684a9bbbcbb08c32ae8abecb835c0c20e3b0ba71402a624a10"
    );
    assert_eq!(token.field("exp"), Some("2000"));
}

#[test]
fn test_should_sign_with_transition_key() {
    let primary = TokenConfig::builder()
        .key(KEY)
        .end_time(1500)
        .build();
    let transition = TokenConfig {
        key: TRANSITION_KEY.to_owned(),
        ..primary.clone()
    };

    let old = generator(primary).generate_url_token("/path").unwrap();
    let new = generator(transition).generate_url_token("/path").unwrap();

    assert_eq!(
        new.as_str(),
        "exp=1500~hmac=5982e37fab9dfb68e1229b94fdb40c914c22b0de14731cfc90e4df0903ae6b49"
    );
    assert_ne!(old.hmac(), new.hmac());
}

#[test]
fn test_should_keep_salt_out_of_visible_token() {
    let config = TokenConfig::builder()
        .key(KEY)
        .salt("pepper")
        .end_time(1500)
        .build();

    let token = generator(config).generate(&url_request("/path")).unwrap();

    assert_eq!(
        token.as_str(),
        "exp=1500~hmac=ec81fd6dd671b937feeb160725d0e06c31d3ef4b6f1f23cb08df08b38a4f90f3"
    );
}

#[test]
fn test_should_be_deterministic_with_fixed_clock() {
    let config = TokenConfig::builder()
        .key(KEY)
        .window_seconds(DEFAULT_WINDOW_SECONDS)
        .build();
    let generator = generator(config);
    let request = GenerationRequest::builder()
        .url("/path")
        .ip("10.0.0.1")
        .payload("p")
        .build();

    assert_eq!(
        generator.generate(&request).unwrap(),
        generator.generate(&request).unwrap()
    );
}

#[test]
fn test_should_change_hmac_when_any_signed_input_changes() {
    let base_config = TokenConfig::builder()
        .key(KEY)
        .window_seconds(DEFAULT_WINDOW_SECONDS)
        .build();
    let base_request = GenerationRequest::builder()
        .url("/path")
        .ip("10.0.0.1")
        .session_id("s")
        .payload("p")
        .start_time(StartTime::At(NOW))
        .build();
    let baseline = generator(base_config.clone())
        .generate(&base_request)
        .unwrap();

    let request_variants = [
        GenerationRequest {
            ip: Some("10.0.0.2".to_owned()),
            ..base_request.clone()
        },
        GenerationRequest {
            start_time: Some(StartTime::At(NOW + 1)),
            ..base_request.clone()
        },
        GenerationRequest {
            end_time: Some(NOW + 600),
            ..base_request.clone()
        },
        GenerationRequest {
            url: Some("/other".to_owned()),
            ..base_request.clone()
        },
        GenerationRequest {
            session_id: Some("t".to_owned()),
            ..base_request.clone()
        },
        GenerationRequest {
            payload: Some("q".to_owned()),
            ..base_request.clone()
        },
    ];
    for request in &request_variants {
        let token = generator(base_config.clone()).generate(request).unwrap();
        assert_ne!(token.hmac(), baseline.hmac(), "request {request:?}");
    }

    let config_variants = [
        TokenConfig {
            salt: Some("pepper".to_owned()),
            ..base_config.clone()
        },
        TokenConfig {
            key: TRANSITION_KEY.to_owned(),
            ..base_config.clone()
        },
        TokenConfig {
            algorithm: Algorithm::Md5,
            ..base_config.clone()
        },
    ];
    for config in config_variants {
        let token = generator(config).generate(&base_request).unwrap();
        assert_ne!(token.hmac(), baseline.hmac());
        let body = |t: &str| t.rsplit_once("~hmac=").map(|(b, _)| b.to_owned());
        assert_eq!(body(token.as_str()), body(baseline.as_str()));
    }
}

#[test]
fn test_should_never_emit_url_field() {
    let config = TokenConfig::builder()
        .key(KEY)
        .window_seconds(DEFAULT_WINDOW_SECONDS)
        .build();
    let generator = generator(config);

    let url = generator.generate(&url_request("/a")).unwrap();
    let acl = generator
        .generate(&GenerationRequest::builder().acl("/a").build())
        .unwrap();

    assert_eq!(url.field("url"), None);
    assert_eq!(url.field("acl"), None);
    assert_eq!(acl.field("acl"), Some("/a"));
    assert_eq!(acl.field("url"), None);
    assert_ne!(url.hmac(), acl.hmac());
}

#[test]
fn test_should_derive_expiry_from_window() {
    let config = TokenConfig::builder()
        .key(KEY)
        .window_seconds(DEFAULT_WINDOW_SECONDS)
        .build();
    let generator = generator(config);

    let token = generator.generate(&url_request("/path")).unwrap();
    assert_eq!(token.field("st"), None);
    assert_eq!(token.field("exp"), Some("1700000500"));

    let request = GenerationRequest::builder()
        .url("/path")
        .start_time(StartTime::At(1000))
        .build();
    let token = generator.generate(&request).unwrap();
    assert_eq!(token.field("st"), Some("1000"));
    assert_eq!(token.field("exp"), Some("1500"));
}

#[test]
fn test_should_match_example_token_shape_per_algorithm() {
    let sha256 = generator(
        TokenConfig::builder()
            .key(KEY)
            .window_seconds(DEFAULT_WINDOW_SECONDS)
            .build(),
    )
    .generate_url_token("/path")
    .unwrap();
    let md5 = generator(
        TokenConfig::builder()
            .key(KEY)
            .window_seconds(DEFAULT_WINDOW_SECONDS)
            .algorithm(Algorithm::Md5)
            .build(),
    )
    .generate_url_token("/path")
    .unwrap();

    assert_eq!(sha256.hmac().len(), 64);
    assert_eq!(md5.hmac().len(), 32);
    assert_eq!(
        sha256.as_str().split_once("hmac=").map(|(p, _)| p),
        md5.as_str().split_once("hmac=").map(|(p, _)| p)
    );
}

#[test]
fn test_should_reject_invalid_generation_inputs() {
    let generator = generator(TokenConfig::builder().key(KEY).build());

    let expired = GenerationRequest::builder()
        .url("/p")
        .start_time(StartTime::At(2_000_000_000))
        .end_time(1_000_000_000)
        .build();
    assert!(matches!(
        generator.generate(&expired),
        Err(TokenError::AlreadyExpired { .. })
    ));

    let negative_window = GenerationRequest::builder()
        .url("/p")
        .window_seconds(-1)
        .build();
    assert_eq!(
        generator.generate(&negative_window),
        Err(TokenError::NonPositiveWindow(-1))
    );

    assert_eq!(
        generator.generate(&url_request("/p")),
        Err(TokenError::MissingExpiry)
    );

    let both = GenerationRequest::builder().url("/p").acl("/p").build();
    assert_eq!(generator.generate(&both), Err(TokenError::MissingTarget));

    assert!(matches!(
        TokenConfig::from_lookup(|name| match name {
            "EDGEAUTH_KEY" => Some(KEY.to_owned()),
            "EDGEAUTH_WINDOW_SECONDS" => Some("hello".to_owned()),
            _ => None,
        }),
        Err(TokenError::InvalidTime(_))
    ));
}

#[test]
fn test_should_reject_empty_key() {
    assert_eq!(
        TokenGenerator::new(TokenConfig::builder().key("").build()).unwrap_err(),
        TokenError::MissingKey
    );
}
