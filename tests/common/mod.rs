#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

use crime_lens::model::{IncidentRecord, IncidentTable};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}

/// A small raw export with the messy headers the normalizer has to cope
/// with: mixed casing, extra words, an accented month column, and a year
/// column.
pub const SAMPLE_EXPORT: &str = "\
Ano,Natureza da Ocorrência,bairro,Hora Aproximada,Dia da Semana,Tipo de Ambiente,Mês
2024,roubo,centro,14:30,SEG,rua,jan
2024,ROUBO,CENTRO,22,TER,RUA,jan
2024,roubo agravado,centro,10,QUA,comercio,fev
2024,dano,jardim,21,SEX,residencia,ago
2024,violacao de domicilio,jardim,3,SAB,residencia,set
2024,furto simples,centro,9,DOM,comercio,jan
2025,roubo,centro,11,SEG,rua,mar
";

pub fn incident(
    category: &str,
    neighborhood: &str,
    hour: i64,
    weekday: &str,
    environment: &str,
    month: &str,
) -> IncidentRecord {
    IncidentRecord {
        category: category.to_string(),
        neighborhood: neighborhood.to_string(),
        hour,
        weekday: weekday.to_string(),
        environment: environment.to_string(),
        month: month.to_string(),
    }
}

pub fn table_of(records: Vec<IncidentRecord>) -> IncidentTable {
    IncidentTable::new(records, None)
}
