use actix_web::web;

pub mod routes {
    pub mod link;
    pub mod newsletter;
    pub mod page;
    pub mod redirect;
    pub mod signup;
}

pub mod services {
    pub mod link;
    pub mod newsletter;
    pub mod page;
    pub mod redirect;
    pub mod signup;
}

pub mod dtos {
    pub mod link;
    pub mod newsletter;
    pub mod page;
    pub mod redirect;
    pub mod signup;
}

pub mod misc {
    pub mod short_code;
    pub mod validate;
}

/// Visitor-facing routes, mounted under `/api` behind optional auth.
/// Empty prefix, so it has to be the last service registered on its parent.
pub fn mount_public() -> actix_web::Scope {
    web::scope("")
        .service(routes::link::post_shorten)
        .service(routes::redirect::get_redirect)
        .service(routes::newsletter::post_newsletter)
        .service(routes::page::get_page)
}

/// Owner routes, mounted under `/api/dashboard` behind required auth.
/// Empty prefix, so it has to be the last service registered on its parent.
pub fn mount_dashboard() -> actix_web::Scope {
    web::scope("")
        .service(routes::link::get_links)
        .service(routes::link::patch_toggle_link)
        .service(routes::link::delete_link)
        .service(routes::page::post_page)
        .service(routes::page::delete_page)
        .service(routes::signup::get_signups)
}
