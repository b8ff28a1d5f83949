pub mod engine;
pub mod send_contribution_reminders;
pub mod send_overdue_escalations;

use actix_web::web;
use send_contribution_reminders::trigger_contribution_reminders_controller;
use send_overdue_escalations::trigger_overdue_escalations_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reminders/contributions/trigger",
        web::post().to(trigger_contribution_reminders_controller),
    );
    cfg.route(
        "/reminders/overdue/trigger",
        web::post().to(trigger_overdue_escalations_controller),
    );
}
