use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Where a section's content is read from and written to first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Try the hero remote, fall back to the local document
    RemoteFirst,
    LocalOnly,
}

/// Named section of the site content document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Hero,
    About,
    Services,
    Certifications,
    Contact,
    Navbar,
    Features,
    Social,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Services,
        SectionKind::Certifications,
        SectionKind::Contact,
        SectionKind::Navbar,
        SectionKind::Features,
        SectionKind::Social,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::About => "about",
            SectionKind::Services => "services",
            SectionKind::Certifications => "certifications",
            SectionKind::Contact => "contact",
            SectionKind::Navbar => "navbar",
            SectionKind::Features => "features",
            SectionKind::Social => "social",
        }
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        match self {
            SectionKind::Hero => SyncPolicy::RemoteFirst,
            _ => SyncPolicy::LocalOnly,
        }
    }

    /// Built-in document used whenever the section has never been saved
    pub fn default_document(&self) -> Value {
        match self {
            SectionKind::Hero => json!({
                "texts": [
                    { "text": "Instituto de Capacitación Técnica" },
                    { "text": "Formación profesional en seguridad industrial y rescate" },
                    { "text": "Capacitación certificada" },
                    { "text": "Preparamos equipos para responder ante emergencias con estándares internacionales." }
                ],
                "title": "Instituto de Capacitación Técnica",
                "subtitle": "Formación profesional en seguridad industrial y rescate",
                "companyName": "Capacitación certificada",
                "description": "Preparamos equipos para responder ante emergencias con estándares internacionales.",
                "backgroundType": "image",
                "backgroundImage": "/upload/hero/backgrounds/default-hero.jpg",
                "backgroundVideo": "",
                "ctaText": "Ver cursos",
                "ctaLink": "#services"
            }),
            SectionKind::About => json!({
                "title": "Sobre nosotros",
                "description": "Más de quince años formando brigadas, rescatistas y personal de seguridad industrial.",
                "mission": "Formar profesionales capaces de proteger vidas en entornos de alto riesgo.",
                "vision": "Ser el referente regional en capacitación técnica para emergencias.",
                "image": "/upload/about/images/default-about.jpg",
                "stats": [
                    { "label": "Alumnos capacitados", "value": "5000+" },
                    { "label": "Empresas atendidas", "value": "300+" },
                    { "label": "Años de experiencia", "value": "15" }
                ]
            }),
            SectionKind::Services => json!({
                "title": "Nuestros servicios",
                "subtitle": "Programas de formación práctica",
                "items": [
                    {
                        "title": "Rescate en altura",
                        "description": "Técnicas de acceso y evacuación con cuerdas.",
                        "icon": "/upload/services/icons/altura.svg"
                    },
                    {
                        "title": "Espacios confinados",
                        "description": "Ingreso seguro, monitoreo de atmósferas y rescate.",
                        "icon": "/upload/services/icons/confinados.svg"
                    },
                    {
                        "title": "Primeros auxilios",
                        "description": "Atención inicial de lesionados y soporte vital básico.",
                        "icon": "/upload/services/icons/auxilios.svg"
                    }
                ]
            }),
            SectionKind::Certifications => json!({
                "title": "Certificaciones",
                "description": "Nuestros programas cuentan con aval oficial.",
                "items": []
            }),
            SectionKind::Contact => json!({
                "title": "Contáctanos",
                "address": "",
                "phone": "",
                "email": "contacto@instituto.example",
                "schedule": "Lunes a viernes, 9:00 a 18:00",
                "mapUrl": ""
            }),
            SectionKind::Navbar => json!({
                "logo": "/upload/media/images/logo.png",
                "links": [
                    { "label": "Inicio", "href": "#hero" },
                    { "label": "Nosotros", "href": "#about" },
                    { "label": "Servicios", "href": "#services" },
                    { "label": "Galería", "href": "#gallery" },
                    { "label": "Contacto", "href": "#contact" }
                ]
            }),
            SectionKind::Features => json!({
                "title": "¿Por qué elegirnos?",
                "items": [
                    { "title": "Instructores certificados", "description": "Personal con experiencia operativa real." },
                    { "title": "Prácticas reales", "description": "Escenarios de entrenamiento equipados." },
                    { "title": "Constancias oficiales", "description": "Documentación válida ante autoridades." }
                ]
            }),
            SectionKind::Social => json!({
                "facebook": "",
                "instagram": "",
                "youtube": "",
                "whatsapp": ""
            }),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SectionKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown content section: {}", s))
    }
}

/// Full default document, keyed by section name
pub fn default_content() -> Map<String, Value> {
    SectionKind::ALL
        .iter()
        .map(|k| (k.as_str().to_string(), k.default_document()))
        .collect()
}

const HERO_TEXT_FIELDS: [&str; 4] = ["title", "subtitle", "companyName", "description"];

/// Re-derive the hero scalar fields from its `texts` array.
///
/// `texts` is authoritative: entry N fills the Nth scalar field and any
/// field without a matching entry is blanked. Entries may be plain strings
/// or objects with a `text` member. Without a `texts` array the document is
/// left untouched.
pub fn normalize_hero(mut data: Value) -> Value {
    let Some(object) = data.as_object_mut() else {
        return data;
    };
    let Some(texts) = object.get("texts").and_then(Value::as_array) else {
        return data;
    };

    let derived: Vec<String> = (0..HERO_TEXT_FIELDS.len())
        .map(|i| texts.get(i).map(hero_text).unwrap_or_default())
        .collect();

    for (field, value) in HERO_TEXT_FIELDS.iter().zip(derived) {
        object.insert(field.to_string(), Value::String(value));
    }

    data
}

fn hero_text(entry: &Value) -> String {
    match entry {
        Value::String(s) => s.clone(),
        Value::Object(o) => o
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}
