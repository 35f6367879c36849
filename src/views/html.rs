use std::fmt::Write;

use crate::csrf;
use crate::forms::{BookingForm, FormErrors};
use crate::models::{BookingRequest, JetCategory};

use super::{Flash, RenderError, Renderer, View};

const STYLE: &str = "body{font-family:sans-serif;background:#0f172a;color:#e2e8f0;margin:2rem}\
label{display:block;margin-top:.75rem}\
.error{color:#f87171}.flash{padding:.75rem;border-radius:4px}\
.flash-success{background:#14532d}.flash-error{background:#7f1d1d}";

/// Рендерер на чистом `format!` с экранированием всех пользовательских данных.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn booking_form(
        &self,
        out: &mut String,
        form: &BookingForm,
        errors: &FormErrors,
        flash: Option<&Flash>,
    ) -> Result<(), RenderError> {
        write!(out, "<h1>Private Jet Charter</h1><p>Request a quote and our team will be in touch.</p>")?;

        if let Some(flash) = flash {
            write!(
                out,
                r#"<div class="flash flash-{}">{}</div>"#,
                flash.level.as_str(),
                escape(&flash.message)
            )?;
        }

        write!(out, r#"<form method="post" action="/" novalidate>"#)?;
        write!(
            out,
            r#"<input type="hidden" name="{}" value="{}">"#,
            csrf::FIELD,
            escape(&form.csrf_token)
        )?;
        field_error(out, errors, csrf::FIELD)?;

        input(out, errors, "full_name", "Full Name", "text", &form.full_name)?;
        input(out, errors, "email", "Email Address", "email", &form.email)?;
        input(out, errors, "phone", "Phone Number", "tel", &form.phone)?;

        write!(out, r#"<label for="jet_category">Jet Category</label>"#)?;
        write!(out, r#"<select id="jet_category" name="jet_category">"#)?;
        write!(out, r#"<option value="">Select jet category</option>"#)?;
        for category in JetCategory::ALL {
            let selected = if form.jet_category == category.as_str() { " selected" } else { "" };
            write!(
                out,
                r#"<option value="{0}"{1}>{0}</option>"#,
                escape(category.as_str()),
                selected
            )?;
        }
        write!(out, "</select>")?;
        field_error(out, errors, "jet_category")?;

        input(out, errors, "departure", "Departure City / Airport", "text", &form.departure)?;
        input(out, errors, "arrival", "Arrival City / Airport", "text", &form.arrival)?;
        input(out, errors, "departure_date", "Departure Date", "date", &form.departure_date)?;
        input(out, errors, "passengers", "Number of Passengers", "number", &form.passengers)?;

        write!(
            out,
            r#"<label for="special_requests">Special Requests (pets, catering, etc.)</label><textarea id="special_requests" name="special_requests">{}</textarea>"#,
            escape(&form.special_requests)
        )?;

        write!(out, r#"<p><button type="submit">Get My Quote →</button></p></form>"#)?;
        Ok(())
    }

    fn request_list(&self, out: &mut String, requests: &[BookingRequest]) -> Result<(), RenderError> {
        write!(out, "<h1>Booking Requests</h1>")?;
        write!(out, r#"<table border="1" style="border-collapse: collapse; width:100%;">"#)?;
        write!(
            out,
            r#"<tr style="background:#334155;"><th>ID</th><th>Date</th><th>Name</th><th>Email</th><th>From → To</th><th>Jet</th><th>Passengers</th><th>Date</th></tr>"#
        )?;

        for r in requests {
            write!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} → {}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                r.id,
                r.created_at.format("%Y-%m-%d %H:%M"),
                escape(&r.full_name),
                escape(&r.email),
                escape(&r.departure),
                escape(&r.arrival),
                escape(r.jet_category.as_str()),
                r.passengers,
                r.departure_date.format("%Y-%m-%d"),
            )?;
        }

        write!(out, r#"</table><p><a href="/">Back to home</a></p>"#)?;
        Ok(())
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError> {
        let mut body = String::new();
        let title = match view {
            View::BookingForm { form, errors, flash } => {
                self.booking_form(&mut body, form, errors, *flash)?;
                "Private Jet Charter – Get a Quote"
            }
            View::RequestList { requests } => {
                self.request_list(&mut body, requests)?;
                "Booking Requests"
            }
        };

        let mut page = String::with_capacity(body.len() + 512);
        write!(
            page,
            r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>{}</title><style>{}</style></head><body>{}</body></html>"#,
            title, STYLE, body
        )?;
        Ok(page)
    }
}

fn input(
    out: &mut String,
    errors: &FormErrors,
    name: &'static str,
    label: &str,
    kind: &str,
    value: &str,
) -> Result<(), RenderError> {
    write!(
        out,
        r#"<label for="{name}">{label}</label><input id="{name}" name="{name}" type="{kind}" value="{value}">"#,
        value = escape(value)
    )?;
    field_error(out, errors, name)
}

fn field_error(out: &mut String, errors: &FormErrors, name: &str) -> Result<(), RenderError> {
    if let Some(message) = errors.get(name) {
        write!(out, r#"<span class="error" data-field="{}">{}</span>"#, name, escape(message))?;
    }
    Ok(())
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
