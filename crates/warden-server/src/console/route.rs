use actix_web::{Scope, web};

pub fn routes() -> Scope {
    web::scope("/v1/system")
        .service(super::menu::detail)
        .service(super::menu::list)
        .service(super::menu::tree)
        .service(super::menu::create)
        .service(super::menu::update)
        .service(super::menu::delete)
        .service(super::menu::set_available)
        .service(super::role::detail)
        .service(super::role::set_available)
        .service(super::role::set_permission)
        .service(super::health::health)
}
