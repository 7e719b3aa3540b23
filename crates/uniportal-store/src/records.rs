//! Row shapes exchanged with SurrealDB

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use uniportal_core::{Advisor, Course, GeneralDocument, NewGeneralDocument, Student};

#[derive(Debug, Deserialize)]
pub(crate) struct CountRow {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StudentRecord {
    id: Thing,
    codigo_estudiante: String,
    password_hash: String,
    nombre_completo: String,
    carrera: String,
    promedio_ponderado: f64,
    #[serde(default)]
    asesor: Option<Advisor>,
    #[serde(default)]
    cursos_inscritos: Vec<Course>,
}

impl From<StudentRecord> for Student {
    fn from(r: StudentRecord) -> Self {
        Student {
            id: r.id.id.to_string(),
            codigo_estudiante: r.codigo_estudiante,
            password_hash: r.password_hash,
            nombre_completo: r.nombre_completo,
            carrera: r.carrera,
            promedio_ponderado: r.promedio_ponderado,
            asesor: r.asesor,
            cursos_inscritos: r.cursos_inscritos,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GeneralDocumentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    tipo: String,
    contenido: String,
}

impl From<NewGeneralDocument> for GeneralDocumentRecord {
    fn from(doc: NewGeneralDocument) -> Self {
        Self {
            id: None,
            tipo: doc.tipo,
            contenido: doc.contenido,
        }
    }
}

impl From<GeneralDocumentRecord> for GeneralDocument {
    fn from(r: GeneralDocumentRecord) -> Self {
        NewGeneralDocument::new(r.tipo, r.contenido)
            .with_id(r.id.map(|t| t.id.to_string()).unwrap_or_default())
    }
}
