//! Security headers applied to every response.
//!
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options: DENY`
//! - `Referrer-Policy: no-referrer`
//! - `Content-Security-Policy` locked down to a JSON API
//! - `Cross-Origin-Opener-Policy` and `Cross-Origin-Resource-Policy: same-origin`
//! - `X-XSS-Protection: 0`, which disables the legacy browser filter
//! - `Strict-Transport-Security` when serving production traffic
//!
//! Headers a handler already set are left alone.

use actix_web::middleware::DefaultHeaders;

pub fn security_headers(enable_hsts: bool) -> DefaultHeaders {
    let headers = DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "no-referrer"))
        .add((
            "Content-Security-Policy",
            "default-src 'none'; frame-ancestors 'none'",
        ))
        .add(("Cross-Origin-Opener-Policy", "same-origin"))
        .add(("Cross-Origin-Resource-Policy", "same-origin"))
        .add(("X-XSS-Protection", "0"));

    if enable_hsts {
        headers.add((
            "Strict-Transport-Security",
            "max-age=15552000; includeSubDomains",
        ))
    } else {
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    #[actix_rt::test]
    async fn test_security_headers_applied() {
        let app = test::init_service(
            App::new()
                .wrap(security_headers(false))
                .route("/", web::get().to(ok)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let headers = resp.headers();
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
        assert_eq!(headers.get("X-XSS-Protection").unwrap(), "0");
        assert!(headers.get("Content-Security-Policy").is_some());
        assert!(headers.get("Strict-Transport-Security").is_none());
    }

    #[actix_rt::test]
    async fn test_hsts_enabled_in_production() {
        let app = test::init_service(
            App::new()
                .wrap(security_headers(true))
                .route("/", web::get().to(ok)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert!(resp.headers().get("Strict-Transport-Security").is_some());
    }

    #[actix_rt::test]
    async fn test_error_responses_carry_headers() {
        let app = test::init_service(App::new().wrap(security_headers(false))).await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await;
        assert_eq!(resp.status(), 404);
        assert_eq!(resp.headers().get("X-Frame-Options").unwrap(), "DENY");
    }
}
