use crate::{
    algebra::*,
    solver::{backend::SdpSolverBackend, ProblemData, Sdpi, SdpiError, SdpiSettings},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// The stored problem together with the settings, in the user facing
// input format.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonProblemData<T: FloatT> {
    pub problem: ProblemData<T>,
    pub settings: SdpiSettings<T>,
}

impl<T> Sdpi<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Write the stored problem and the settings as JSON.
    pub fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let mut json_data = JsonProblemData {
            problem: self.problem.to_data(),
            settings: self.settings.clone(),
        };

        // infinite sides and bounds can't be serialized
        sanitize_problem(&mut json_data.problem);

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    /// Read a problem written by [`write_to_file`](Sdpi::write_to_file)
    /// into a new interface around `backend`.
    pub fn read_from_file(
        file: &mut File,
        backend: Box<dyn SdpSolverBackend<T>>,
    ) -> Result<Self, SdpiError> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut json_data: JsonProblemData<T> =
            serde_json::from_str(&buffer).map_err(io::Error::from)?;

        // restore sanitized values to their original infinities
        desanitize_problem(&mut json_data.problem);

        let mut sdpi = Self::new(json_data.settings, backend)?;
        sdpi.load(&json_data.problem)?;
        Ok(sdpi)
    }
}

fn sanitize_problem<T: FloatT>(data: &mut ProblemData<T>) {
    let values = data.lb.iter_mut().chain(data.ub.iter_mut());
    let sides = data.rows.iter_mut().flat_map(|r| [&mut r.lhs, &mut r.rhs]);
    for x in values.chain(sides) {
        if x.is_infinite() {
            *x = T::max_value().copysign(*x);
        }
    }
}

fn desanitize_problem<T: FloatT>(data: &mut ProblemData<T>) {
    let values = data.lb.iter_mut().chain(data.ub.iter_mut());
    let sides = data.rows.iter_mut().flat_map(|r| [&mut r.lhs, &mut r.rhs]);
    for x in values.chain(sides) {
        if x.abs() == T::max_value() {
            *x = T::infinity().copysign(*x);
        }
    }
}

#[test]
fn test_json_io() {
    use crate::solver::*;
    use std::io::{Seek, SeekFrom};

    let data = ProblemData {
        obj: vec![1.0, -1.0],
        lb: vec![-1.0, f64::NEG_INFINITY],
        ub: vec![3.0, 2.0],
        isintegral: None,
        blocks: vec![SdpBlock {
            size: 2,
            vars: vec![BlockVar {
                var: 0,
                entries: Triplets::from_parts(vec![0, 1], vec![0, 1], vec![1.0, 1.0]).unwrap(),
            }],
            constant: Triplets::from_parts(vec![1], vec![0], vec![0.5]).unwrap(),
        }],
        rows: vec![LpRow::new(f64::NEG_INFINITY, 4.0, vec![0, 1], vec![1.0, 1.0])],
    };

    let settings = SdpiSettingsBuilder::default()
        .gaptol(1e-5)
        .build()
        .unwrap();
    let mut sdpi = Sdpi::<f64>::new(settings, Box::<NoBackend>::default()).unwrap();
    sdpi.load(&data).unwrap();

    let mut file = tempfile::tempfile().unwrap();
    sdpi.write_to_file(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let sdpi2 = Sdpi::<f64>::read_from_file(&mut file, Box::<NoBackend>::default()).unwrap();
    assert_eq!(sdpi2.problem().to_data(), sdpi.problem().to_data());
    assert_eq!(sdpi2.settings(), sdpi.settings());
    assert_eq!(sdpi2.lhs()[0], f64::NEG_INFINITY);
}
