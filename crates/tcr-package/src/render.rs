//! Human-readable report rendering
//!
//! Every user or service supplied string is HTML-escaped. The vector
//! diagram is embedded as an image data URL so its markup never runs in
//! the document.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt::Write as _;
use tcr_model::{catalog, Language, ReportRecord, VehicleLabel};

/// Static labels for one language
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub title: &'static str,
    pub general: &'static str,
    pub date_time: &'static str,
    pub location: &'static str,
    pub weather: &'static str,
    pub light: &'static str,
    pub parties: &'static str,
    pub vehicle: &'static str,
    pub plate: &'static str,
    pub make_model: &'static str,
    pub first_impact: &'static str,
    pub manoeuvre: &'static str,
    pub violations: &'static str,
    pub driver: &'static str,
    pub name: &'static str,
    pub id_no: &'static str,
    pub licence_no: &'static str,
    pub phone: &'static str,
    pub statement: &'static str,
    pub insurance: &'static str,
    pub company: &'static str,
    pub policy_no: &'static str,
    pub witnesses: &'static str,
    pub visuals: &'static str,
    pub sketch: &'static str,
    pub diagram: &'static str,
    pub notes: &'static str,
    pub not_available: &'static str,
    pub signatures: &'static str,
    pub not_signed: &'static str,
    pub consent: &'static str,
    pub yes: &'static str,
    pub no: &'static str,
}

const EN: Labels = Labels {
    title: "Accident Report",
    general: "General Information",
    date_time: "Date & Time",
    location: "Location",
    weather: "Weather",
    light: "Light Conditions",
    parties: "Parties Involved",
    vehicle: "Vehicle",
    plate: "License Plate",
    make_model: "Make/Model",
    first_impact: "Initial Impact",
    manoeuvre: "Manoeuvre",
    violations: "Alleged Violations",
    driver: "Driver",
    name: "Name",
    id_no: "ID No",
    licence_no: "License No",
    phone: "Phone",
    statement: "Statement",
    insurance: "Insurance",
    company: "Company",
    policy_no: "Policy No",
    witnesses: "Witnesses",
    visuals: "Accident Visuals",
    sketch: "AI Generated Sketch",
    diagram: "Interactive Diagram",
    notes: "Notes",
    not_available: "Not available",
    signatures: "Signatures",
    not_signed: "Not signed",
    consent: "Consent",
    yes: "Yes",
    no: "No",
};

const TR: Labels = Labels {
    title: "Kaza Tespit Tutanağı",
    general: "Genel Bilgiler",
    date_time: "Tarih ve Saat",
    location: "Konum",
    weather: "Hava Durumu",
    light: "Işık Koşulları",
    parties: "Taraflar",
    vehicle: "Araç",
    plate: "Plaka",
    make_model: "Marka/Model",
    first_impact: "İlk Çarpma Noktası",
    manoeuvre: "Manevra",
    violations: "İddia Edilen İhlaller",
    driver: "Sürücü",
    name: "Ad Soyad",
    id_no: "T.C. Kimlik No",
    licence_no: "Ehliyet No",
    phone: "Telefon",
    statement: "Beyan",
    insurance: "Sigorta",
    company: "Şirket",
    policy_no: "Poliçe No",
    witnesses: "Tanıklar",
    visuals: "Kaza Görselleri",
    sketch: "Yapay Zeka Krokisi",
    diagram: "Etkileşimli Şema",
    notes: "Notlar",
    not_available: "Mevcut değil",
    signatures: "İmzalar",
    not_signed: "İmzalanmadı",
    consent: "Onay",
    yes: "Evet",
    no: "Hayır",
};

/// Label table for `language`
#[must_use]
pub fn labels(language: Language) -> &'static Labels {
    match language {
        Language::En => &EN,
        Language::Tr => &TR,
    }
}

/// Escape text for element content and quoted attributes
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

const STYLE: &str = "body { font-family: sans-serif; margin: 2rem; color: #333; }
h1, h2, h3 { color: #111; }
.container { max-width: 800px; margin: auto; }
.section { border: 1px solid #ccc; padding: 1rem; margin-bottom: 1rem; border-radius: 8px; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.signature-box img { border: 1px solid #ccc; border-radius: 4px; }
.diagram-container img { max-width: 100%; height: auto; border: 1px solid #eee; border-radius: 4px; }";

/// Render the record as a standalone HTML document in its own language
#[must_use]
pub fn render_html(record: &ReportRecord) -> String {
    let l = labels(record.language);
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n<div class=\"container\">\n<h1>{title}</h1>\n",
        lang = record.language.code().to_ascii_lowercase(),
        title = l.title,
    );

    html.push_str("<div class=\"section\">\n");
    let _ = writeln!(html, "<h2>{}</h2>", l.general);
    field(&mut html, l.date_time, &record.accident.timestamp);
    field(&mut html, l.location, &record.accident.geo.address);
    field(&mut html, l.weather, &record.accident.weather);
    field(&mut html, l.light, &record.accident.light);
    html.push_str("</div>\n");

    let _ = writeln!(html, "<h2>{}</h2>\n<div class=\"grid\">", l.parties);
    for label in VehicleLabel::ALL {
        render_party(&mut html, record, label, l);
    }
    html.push_str("</div>\n");

    if !record.witnesses.is_empty() {
        let _ = writeln!(html, "<div class=\"section\">\n<h2>{}</h2>", l.witnesses);
        for witness in &record.witnesses {
            field(&mut html, &witness.name, &witness.phone);
        }
        html.push_str("</div>\n");
    }

    render_visuals(&mut html, record, l);
    render_signatures(&mut html, record, l);

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn field(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        html,
        "<p><strong>{}:</strong> {}</p>",
        escape_html(label),
        escape_html(value)
    );
}

fn render_party(html: &mut String, record: &ReportRecord, label: VehicleLabel, l: &Labels) {
    let vehicle = record.vehicle(label);
    let driver = record.driver(label);
    let insurance = record.insurance(label);

    html.push_str("<div>\n<div class=\"section\">\n");
    let _ = writeln!(html, "<h3>{} {}</h3>", l.vehicle, label);
    field(html, l.plate, &vehicle.plate);
    field(html, l.make_model, &vehicle.make_model);
    field(html, l.first_impact, &vehicle.first_impact);
    field(html, l.manoeuvre, &vehicle.manoeuvre);
    if !vehicle.alleged_violations.is_empty() {
        let _ = writeln!(html, "<p><strong>{}:</strong></p>\n<ul>", l.violations);
        for id in &vehicle.alleged_violations {
            let text = catalog::lookup(record.locale, id).map_or(id.as_str(), |v| v.text);
            let _ = writeln!(html, "<li>{}</li>", escape_html(text));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</div>\n<div class=\"section\">\n");

    let _ = writeln!(html, "<h3>{} {}</h3>", l.driver, label);
    field(html, l.name, &driver.name);
    field(html, l.id_no, &driver.id_no);
    field(html, l.licence_no, &driver.licence_no);
    field(html, l.phone, &driver.phone);
    field(html, l.statement, &driver.statement);
    html.push_str("</div>\n<div class=\"section\">\n");

    let _ = writeln!(html, "<h3>{} {}</h3>", l.insurance, label);
    field(html, l.company, &insurance.company);
    field(html, l.policy_no, &insurance.policy_no);
    html.push_str("</div>\n</div>\n");
}

fn render_visuals(html: &mut String, record: &ReportRecord, l: &Labels) {
    let _ = writeln!(
        html,
        "<div class=\"section\">\n<h2>{}</h2>\n<div class=\"grid\">\n<div class=\"diagram-container\">\n<h3>{}</h3>",
        l.visuals, l.sketch
    );
    match &record.diagram.sketch_base64 {
        Some(sketch) => {
            let _ = writeln!(
                html,
                "<img src=\"data:image/png;base64,{}\" alt=\"{}\" />",
                escape_html(sketch),
                l.sketch
            );
        }
        None => {
            let _ = writeln!(html, "<p>{}</p>", l.not_available);
        }
    }
    let _ = writeln!(
        html,
        "</div>\n<div class=\"diagram-container\">\n<h3>{}</h3>\n<img src=\"data:image/svg+xml;base64,{}\" alt=\"{}\" />\n</div>\n</div>",
        l.diagram,
        STANDARD.encode(record.diagram.svg.as_bytes()),
        l.diagram
    );
    if !record.diagram.notes.is_empty() {
        field(html, l.notes, &record.diagram.notes);
    }
    html.push_str("</div>\n");
}

fn render_signatures(html: &mut String, record: &ReportRecord, l: &Labels) {
    let _ = writeln!(html, "<h2>{}</h2>\n<div class=\"grid\">", l.signatures);
    for label in VehicleLabel::ALL {
        let _ = writeln!(
            html,
            "<div class=\"signature-box\">\n<h3>{} {}</h3>",
            l.driver, label
        );
        match record.signatures.get(label) {
            Some(image) if image.starts_with("data:image/") => {
                let _ = writeln!(
                    html,
                    "<img src=\"{}\" alt=\"{} {}\" width=\"200\" />",
                    escape_html(image),
                    l.driver,
                    label
                );
            }
            _ => {
                let _ = writeln!(html, "<p>{}</p>", l.not_signed);
            }
        }
        let consent = if *record.consent.get(label) { l.yes } else { l.no };
        field(html, l.consent, consent);
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcr_model::SessionConfig;
    use tcr_model::Locale;

    fn record(locale: Locale, language: Language) -> ReportRecord {
        ReportRecord::with_timestamp(SessionConfig::new(locale, language), "2026-10-18T10:15")
    }

    #[test]
    fn escapes_user_text() {
        let mut r = record(Locale::Uk, Language::En);
        r.driver_mut(VehicleLabel::A).statement = "<script>alert('x')</script> & more".into();
        let html = render_html(&r);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
    }

    #[test]
    fn renders_in_session_language_with_catalog_text() {
        let mut r = record(Locale::Tr, Language::Tr);
        r.toggle_violation(VehicleLabel::B, "tr_1").unwrap();
        let html = render_html(&r);
        assert!(html.contains("<html lang=\"tr\">"));
        assert!(html.contains("Kaza Tespit Tutanağı"));
        assert!(html.contains("<li>Kırmızı ışık ihlali</li>"));
        assert!(html.contains("İmzalanmadı"));
    }

    #[test]
    fn diagram_is_embedded_as_image_and_signatures_rendered() {
        let mut r = record(Locale::Uk, Language::En);
        r.set_diagram_svg("<svg onload=\"x\"></svg>");
        r.set_signature(VehicleLabel::A, Some("data:image/png;base64,AAAA".into()));
        r.set_signature(VehicleLabel::B, Some("javascript:alert(1)".into()));
        let html = render_html(&r);

        assert!(!html.contains("onload"));
        assert!(html.contains("data:image/svg+xml;base64,"));
        assert!(html.contains("<img src=\"data:image/png;base64,AAAA\" alt=\"Driver A\""));
        assert!(!html.contains("javascript:"));
        assert!(html.contains("<p>Not available</p>"));
    }
}
