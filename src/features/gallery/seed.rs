use crate::features::gallery::models::{CategorySeed, ImageFields, MediaType};
use crate::shared::validation::slugify;

fn image(src: &str, title: &str, description: &str, tags: &[&str]) -> ImageFields {
    ImageFields {
        src: src.to_string(),
        alt: title.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        media_type: MediaType::Image,
        thumbnail_src: None,
    }
}

fn video(src: &str, poster: &str, title: &str, description: &str, tags: &[&str]) -> ImageFields {
    ImageFields {
        media_type: MediaType::Video,
        thumbnail_src: Some(poster.to_string()),
        ..image(src, title, description, tags)
    }
}

fn category(name: &str, images: Vec<ImageFields>) -> CategorySeed {
    CategorySeed {
        name: name.to_string(),
        slug: slugify(name),
        images,
    }
}

/// Fixed gallery restored by a reset
pub fn default_gallery() -> Vec<CategorySeed> {
    vec![
        category(
            "Capacitaciones",
            vec![
                image(
                    "/upload/gallery/images/capacitacion-altura.jpg",
                    "Rescate en altura",
                    "Práctica de descenso controlado con cuerdas.",
                    &["altura", "cuerdas"],
                ),
                image(
                    "/upload/gallery/images/capacitacion-auxilios.jpg",
                    "Primeros auxilios",
                    "Simulacro de atención a lesionados.",
                    &["primeros auxilios"],
                ),
                video(
                    "/upload/gallery/videos/capacitacion-confinados.mp4",
                    "/upload/gallery/thumbnails/capacitacion-confinados.jpg",
                    "Espacios confinados",
                    "Ingreso y extracción en espacio confinado.",
                    &["confinados", "video"],
                ),
            ],
        ),
        category(
            "Instalaciones",
            vec![
                image(
                    "/upload/gallery/images/instalaciones-torre.jpg",
                    "Torre de entrenamiento",
                    "Torre de doce metros para prácticas verticales.",
                    &["torre"],
                ),
                image(
                    "/upload/gallery/images/instalaciones-aulas.jpg",
                    "Aulas",
                    "Salones equipados para la parte teórica.",
                    &["aulas"],
                ),
            ],
        ),
        category(
            "Equipos de Rescate",
            vec![
                image(
                    "/upload/gallery/images/equipo-arneses.jpg",
                    "Arneses certificados",
                    "Equipo de protección personal para trabajo en altura.",
                    &["equipo", "altura"],
                ),
                image(
                    "/upload/gallery/images/equipo-camilla.jpg",
                    "Camilla de rescate",
                    "Camilla rígida para evacuación vertical.",
                    &["equipo", "evacuación"],
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gallery_categories() {
        let seed = default_gallery();
        let slugs: Vec<&str> = seed.iter().map(|c| c.slug.as_str()).collect();

        assert_eq!(slugs, vec!["capacitaciones", "instalaciones", "equipos_de_rescate"]);
        assert!(seed.iter().all(|c| !c.images.is_empty()));
        assert!(seed
            .iter()
            .flat_map(|c| &c.images)
            .all(|i| !i.title.is_empty() && !i.src.is_empty()));
    }
}
