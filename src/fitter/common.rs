/// Windowed spectrum data: equal-length energy and count columns.
#[derive(PartialEq, Default, Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Data {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Data {
    /// Select the histogram rows whose energy lies strictly inside
    /// `(xlow, xhigh)`. Rows exactly on either edge are excluded.
    ///
    /// The result may be empty; the solver reports the failure in that case.
    pub fn windowed(rows: &[[f64; 2]], xlow: f64, xhigh: f64) -> Self {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for row in rows {
            if xlow < row[0] && row[0] < xhigh {
                x.push(row[0]);
                y.push(row[1]);
            }
        }
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A fitted quantity with its one-sigma uncertainty.
#[derive(PartialEq, Default, Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Value {
    pub value: f64,
    pub uncertainty: f64,
}

impl Value {
    pub fn new(value: f64, uncertainty: f64) -> Self {
        Self { value, uncertainty }
    }
}
