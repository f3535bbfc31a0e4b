use crate::{api, auth::handlers, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            // Pre-login surface: branch listing + login, tightly rate limited
            .service(
                web::scope("/account")
                    .wrap(login_limiter.clone())
                    .route("/login", web::post().to(handlers::login))
                    .route("/quit", web::post().to(handlers::quit))
                    .route("/password", web::post().to(handlers::set_password)),
            )
            .service(
                web::scope("/company")
                    .wrap(login_limiter)
                    .route("/query", web::get().to(api::company::query_companies)),
            )
            .service(
                web::scope("")
                    .wrap(protected_limiter)
                    .service(
                        web::scope("/staff")
                            .route("/create", web::post().to(api::staff::create_staff))
                            .route("/edit", web::post().to(api::staff::update_staff))
                            .route("/del/{staff_id}", web::delete().to(api::staff::delete_staff))
                            .route("/query/{staff_id}", web::get().to(api::staff::query_staff))
                            .route(
                                "/query_by_name/{staff_name}",
                                web::get().to(api::staff::query_staff_by_name),
                            )
                            .route(
                                "/query_by_dep/{dep_name}",
                                web::get().to(api::staff::query_staff_by_dep),
                            )
                            .route("/onboard", web::post().to(api::staff::onboard_staff))
                            .route("/promote", web::post().to(api::staff::promote_staff))
                            .route("/transfer", web::post().to(api::staff::transfer_staff))
                            .route("/resign", web::post().to(api::staff::resign_staff))
                            .route("/excel_import", web::post().to(api::staff::import_staff)),
                    )
                    .service(
                        web::scope("/depart")
                            .route("/create", web::post().to(api::department::create_department))
                            .route(
                                "/del/{dep_id}",
                                web::delete().to(api::department::delete_department),
                            )
                            .route("/edit", web::post().to(api::department::update_department))
                            .route(
                                "/query/{dep_id}",
                                web::get().to(api::department::query_departments),
                            ),
                    )
                    .service(
                        web::scope("/rank")
                            .route("/create", web::post().to(api::rank::create_rank))
                            .route("/del/{rank_id}", web::delete().to(api::rank::delete_rank))
                            .route("/edit", web::post().to(api::rank::update_rank))
                            .route("/query/{rank_id}", web::get().to(api::rank::query_ranks)),
                    )
                    .service(
                        web::scope("/attendance_record")
                            .route(
                                "/create",
                                web::post().to(api::attendance_record::create_attendance_record),
                            )
                            .route(
                                "/edit",
                                web::post().to(api::attendance_record::update_attendance_record),
                            )
                            .route(
                                "/delete/{attendance_id}",
                                web::delete().to(api::attendance_record::delete_attendance_record),
                            )
                            .route(
                                "/query/{staff_id}",
                                web::get().to(api::attendance_record::query_attendance_records),
                            )
                            .route(
                                "/query_history/{staff_id}",
                                web::get().to(api::attendance_record::query_attendance_history),
                            )
                            .route(
                                "/get_attend_record_is_pay/{staff_id}/{date}",
                                web::get().to(api::attendance_record::attendance_is_paid),
                            )
                            .route(
                                "/approve/query/{leader_staff_id}",
                                web::get().to(api::attendance_record::query_pending_approvals),
                            )
                            .route(
                                "/approve_accept/{attendance_id}",
                                web::get().to(api::attendance_record::approve_accept),
                            )
                            .route(
                                "/approve_reject/{attendance_id}",
                                web::get().to(api::attendance_record::approve_reject),
                            ),
                    )
                    .service(
                        web::scope("/clock_in")
                            .route("/create", web::post().to(api::clock_in::create_clock_in))
                            .route("/edit", web::post().to(api::clock_in::update_clock_in))
                            .route(
                                "/query/{staff_id}",
                                web::get().to(api::clock_in::query_clock_ins),
                            ),
                    )
                    .service(
                        web::scope("/leave_request")
                            .route(
                                "/create",
                                web::post().to(api::leave_request::create_leave_request),
                            )
                            .route(
                                "/edit",
                                web::post().to(api::leave_request::update_leave_request),
                            )
                            .route(
                                "/query/{staff_id}",
                                web::get().to(api::leave_request::query_leave_requests),
                            )
                            .route(
                                "/approve/query/{leader_staff_id}",
                                web::get().to(api::leave_request::query_pending_leaves),
                            )
                            .route(
                                "/approve_accept/{leave_id}",
                                web::get().to(api::leave_request::approve_leave_accept),
                            )
                            .route(
                                "/approve_reject/{leave_id}",
                                web::get().to(api::leave_request::approve_leave_reject),
                            ),
                    )
                    .service(
                        web::scope("/punch_request")
                            .route(
                                "/create",
                                web::post().to(api::punch_request::create_punch_request),
                            )
                            .route(
                                "/edit",
                                web::post().to(api::punch_request::update_punch_request),
                            )
                            .route(
                                "/query/{staff_id}",
                                web::get().to(api::punch_request::query_punch_requests),
                            )
                            .route(
                                "/approve/query/{leader_staff_id}",
                                web::get().to(api::punch_request::query_pending_punches),
                            )
                            .route(
                                "/approve_accept/{punch_id}",
                                web::get().to(api::punch_request::approve_punch_accept),
                            )
                            .route(
                                "/approve_reject/{punch_id}",
                                web::get().to(api::punch_request::approve_punch_reject),
                            ),
                    )
                    .service(
                        web::scope("/salary")
                            .route("/create", web::post().to(api::salary::create_salary))
                            .route(
                                "/delete/{salary_id}",
                                web::delete().to(api::salary::delete_salary),
                            )
                            .route("/edit", web::post().to(api::salary::update_salary))
                            .route(
                                "/query/{staff_id}",
                                web::get().to(api::salary::query_salaries),
                            ),
                    )
                    .service(
                        web::scope("/salary_record")
                            .route(
                                "/query/{staff_id}",
                                web::get().to(api::salary::query_salary_records),
                            )
                            .route(
                                "/get_salary_record_is_pay_by_id/{id}",
                                web::get().to(api::salary::get_salary_record_is_pay),
                            )
                            .route(
                                "/pay_salary_record_by_id/{id}",
                                web::get().to(api::salary::pay_salary_record),
                            )
                            .route(
                                "/query_history/{staff_id}",
                                web::get().to(api::salary::query_paid_salary_records),
                            ),
                    )
                    .service(
                        web::scope("/notification")
                            .route(
                                "/create",
                                web::post().to(api::notification::create_notification),
                            )
                            .route(
                                "/delete/{notice_id}",
                                web::delete().to(api::notification::delete_notification),
                            )
                            .route("/edit", web::post().to(api::notification::update_notification))
                            .route(
                                "/query/{notice_title}",
                                web::get().to(api::notification::query_notifications),
                            ),
                    )
                    .service(
                        web::scope("/recruitment")
                            .route(
                                "/create",
                                web::post().to(api::recruitment::create_recruitment),
                            )
                            .route(
                                "/delete/{recruitment_id}",
                                web::delete().to(api::recruitment::delete_recruitment),
                            )
                            .route("/edit", web::post().to(api::recruitment::update_recruitment))
                            .route(
                                "/query/{job_name}",
                                web::get().to(api::recruitment::query_recruitments),
                            ),
                    )
                    .service(
                        web::scope("/candidate")
                            .route("/create", web::post().to(api::recruitment::create_candidate))
                            .route(
                                "/delete/{candidate_id}",
                                web::delete().to(api::recruitment::delete_candidate),
                            )
                            .route("/edit", web::post().to(api::recruitment::update_candidate))
                            .route(
                                "/query_by_name/{name}",
                                web::get().to(api::recruitment::query_candidates_by_name),
                            )
                            .route(
                                "/query_by_staff_id/{staff_id}",
                                web::get().to(api::recruitment::query_candidates_by_staff),
                            )
                            .route(
                                "/accept/{id}",
                                web::get().to(api::recruitment::accept_candidate),
                            )
                            .route(
                                "/reject/{id}",
                                web::get().to(api::recruitment::reject_candidate),
                            ),
                    )
                    .service(
                        web::scope("/operation_log")
                            .route(
                                "/query",
                                web::get().to(api::operation_log::query_operation_logs),
                            )
                            .route(
                                "/detail/{log_id}",
                                web::get().to(api::operation_log::get_operation_log),
                            )
                            .route(
                                "/stats",
                                web::get().to(api::operation_log::operation_log_stats),
                            )
                            .route(
                                "/delete/{log_id}",
                                web::delete().to(api::operation_log::delete_operation_log),
                            )
                            .route(
                                "/purge",
                                web::post().to(api::operation_log::purge_operation_logs),
                            ),
                    )
                    .service(
                        web::scope("/v2")
                            .service(
                                web::scope("/tax/bracket")
                                    .route(
                                        "/create",
                                        web::post().to(api::tax_bracket::create_tax_bracket),
                                    )
                                    .route(
                                        "/query",
                                        web::get().to(api::tax_bracket::query_tax_brackets),
                                    )
                                    .route(
                                        "/edit",
                                        web::post().to(api::tax_bracket::update_tax_bracket),
                                    )
                                    .route(
                                        "/delete/{id}",
                                        web::delete().to(api::tax_bracket::delete_tax_bracket),
                                    ),
                            )
                            .service(
                                web::scope("/insurance/rate")
                                    .route(
                                        "/create",
                                        web::post().to(api::insurance_rate::create_insurance_rate),
                                    )
                                    .route(
                                        "/query",
                                        web::get().to(api::insurance_rate::query_insurance_rates),
                                    )
                                    .route(
                                        "/edit",
                                        web::post().to(api::insurance_rate::update_insurance_rate),
                                    )
                                    .route(
                                        "/delete/{id}",
                                        web::delete().to(api::insurance_rate::delete_insurance_rate),
                                    ),
                            )
                            .service(
                                web::scope("/calculation/rule")
                                    .route(
                                        "/create",
                                        web::post().to(api::calculation_rule::create_calculation_rule),
                                    )
                                    .route(
                                        "/query",
                                        web::get().to(api::calculation_rule::query_calculation_rules),
                                    )
                                    .route(
                                        "/value/{rule_type}",
                                        web::get().to(api::calculation_rule::get_calculation_rule_value),
                                    )
                                    .route(
                                        "/edit",
                                        web::post().to(api::calculation_rule::update_calculation_rule),
                                    )
                                    .route(
                                        "/delete/{id}",
                                        web::delete().to(api::calculation_rule::delete_calculation_rule),
                                    ),
                            )
                            .service(
                                web::scope("/system/parameter")
                                    .route(
                                        "/create",
                                        web::post().to(api::system_parameter::create_system_parameter),
                                    )
                                    .route(
                                        "/query",
                                        web::get().to(api::system_parameter::query_system_parameters),
                                    )
                                    .route(
                                        "/value/{parameter_key}",
                                        web::get()
                                            .to(api::system_parameter::get_system_parameter_value),
                                    )
                                    .route(
                                        "/edit",
                                        web::post().to(api::system_parameter::update_system_parameter),
                                    )
                                    .route(
                                        "/delete/{id}",
                                        web::delete()
                                            .to(api::system_parameter::delete_system_parameter),
                                    ),
                            )
                            .service(web::scope("/history").route(
                                "/parameter/query",
                                web::get().to(api::system_parameter::query_parameter_history),
                            ))
                            .service(
                                web::scope("/template")
                                    .route("/create", web::post().to(api::template::create_template))
                                    .route("/update", web::post().to(api::template::update_template))
                                    .route(
                                        "/delete/{template_id}",
                                        web::delete().to(api::template::delete_template),
                                    )
                                    .route(
                                        "/detail/{template_id}",
                                        web::get().to(api::template::get_template),
                                    )
                                    .route("/query", web::get().to(api::template::query_templates))
                                    .route("/apply", web::post().to(api::template::apply_template))
                                    .route(
                                        "/applicable/{staff_id}",
                                        web::get().to(api::template::applicable_templates),
                                    )
                                    .route(
                                        "/toggle/{template_id}",
                                        web::put().to(api::template::toggle_template),
                                    ),
                            ),
                    ),
            ),
    );
}
