//! Admittance matrix container and dense solver.

use num_complex::Complex64;

use crate::error::{Result, SimulationError};

/// Dense complex matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexMatrix {
    rows: usize,
    cols: usize,
    data: Vec<Complex64>,
}

impl ComplexMatrix {
    /// Create a zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Complex64::new(0.0, 0.0); rows * cols],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.cols + col]
    }

    /// Set element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: Complex64) {
        self.data[row * self.cols + col] = value;
    }

    /// Add to element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: Complex64) {
        self.data[row * self.cols + col] += value;
    }

    /// Zero out one row.
    pub fn clear_row(&mut self, row: usize) {
        let start = row * self.cols;
        self.data[start..start + self.cols].fill(Complex64::new(0.0, 0.0));
    }

    fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// Solved unknowns of one admittance matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixSolution {
    /// Node potentials, one per non-reference node
    pub potentials: Vec<Complex64>,
    /// Branch currents, one per active element
    pub currents: Vec<Complex64>,
}

/// An MNA system for `n` nodes and `m` active elements.
///
/// ```text
/// [ A  B ] [ v ]   [ I ]
/// [ C  D ] [ j ] = [ E ]
/// ```
///
/// A is n×n, B is n×m, C is m×n and D is m×m (reserved, all zero).
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittanceMatrix {
    nodes: usize,
    active: usize,
    a: ComplexMatrix,
    b: ComplexMatrix,
    c: ComplexMatrix,
    d: ComplexMatrix,
    i: Vec<Complex64>,
    e: Vec<Complex64>,
}

impl AdmittanceMatrix {
    /// Create an all-zero system. There must be at least one node.
    pub fn new(nodes: usize, active: usize) -> Result<Self> {
        if nodes == 0 {
            return Err(SimulationError::InvalidDimension { nodes, active });
        }
        let zero = Complex64::new(0.0, 0.0);
        Ok(Self {
            nodes,
            active,
            a: ComplexMatrix::zeros(nodes, nodes),
            b: ComplexMatrix::zeros(nodes, active),
            c: ComplexMatrix::zeros(active, nodes),
            d: ComplexMatrix::zeros(active, active),
            i: vec![zero; nodes],
            e: vec![zero; active],
        })
    }

    /// Number of node unknowns.
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Number of active-element unknowns.
    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Total system size n + m.
    pub fn size(&self) -> usize {
        self.nodes + self.active
    }

    /// Node admittance block A (n×n).
    pub fn a(&self) -> &ComplexMatrix {
        &self.a
    }

    /// Active-element incidence block B (n×m).
    pub fn b(&self) -> &ComplexMatrix {
        &self.b
    }

    /// Active-element constraint block C (m×n).
    pub fn c(&self) -> &ComplexMatrix {
        &self.c
    }

    /// Reserved block D (m×m), all zero.
    pub fn d(&self) -> &ComplexMatrix {
        &self.d
    }

    /// Injected node currents I.
    pub fn i(&self) -> &[Complex64] {
        &self.i
    }

    /// Active-element drive values E.
    pub fn e(&self) -> &[Complex64] {
        &self.e
    }

    /// Replace submatrix A.
    pub fn set_a(&mut self, a: ComplexMatrix) -> Result<()> {
        check_shape("A", (self.nodes, self.nodes), a.shape())?;
        self.a = a;
        Ok(())
    }

    /// Replace submatrix B.
    pub fn set_b(&mut self, b: ComplexMatrix) -> Result<()> {
        check_shape("B", (self.nodes, self.active), b.shape())?;
        self.b = b;
        Ok(())
    }

    /// Replace submatrix C.
    pub fn set_c(&mut self, c: ComplexMatrix) -> Result<()> {
        check_shape("C", (self.active, self.nodes), c.shape())?;
        self.c = c;
        Ok(())
    }

    /// Replace submatrix D.
    pub fn set_d(&mut self, d: ComplexMatrix) -> Result<()> {
        check_shape("D", (self.active, self.active), d.shape())?;
        self.d = d;
        Ok(())
    }

    /// Replace the injected-current vector I.
    pub fn set_i(&mut self, i: Vec<Complex64>) -> Result<()> {
        check_shape("I", (self.nodes, 1), (i.len(), 1))?;
        self.i = i;
        Ok(())
    }

    /// Replace the injected-voltage vector E.
    pub fn set_e(&mut self, e: Vec<Complex64>) -> Result<()> {
        check_shape("E", (self.active, 1), (e.len(), 1))?;
        self.e = e;
        Ok(())
    }

    pub(crate) fn a_mut(&mut self) -> &mut ComplexMatrix {
        &mut self.a
    }

    pub(crate) fn b_mut(&mut self) -> &mut ComplexMatrix {
        &mut self.b
    }

    pub(crate) fn c_mut(&mut self) -> &mut ComplexMatrix {
        &mut self.c
    }

    pub(crate) fn i_mut(&mut self) -> &mut [Complex64] {
        &mut self.i
    }

    pub(crate) fn e_mut(&mut self) -> &mut [Complex64] {
        &mut self.e
    }

    /// Concatenate the submatrices into one (n+m)×(n+m) row-major system.
    fn assemble(&self) -> (Vec<Complex64>, Vec<Complex64>) {
        let n = self.nodes;
        let size = self.size();
        let mut m = vec![Complex64::new(0.0, 0.0); size * size];

        for row in 0..n {
            for col in 0..n {
                m[row * size + col] = self.a.get(row, col);
            }
            for col in 0..self.active {
                m[row * size + n + col] = self.b.get(row, col);
            }
        }
        for row in 0..self.active {
            for col in 0..n {
                m[(n + row) * size + col] = self.c.get(row, col);
            }
            for col in 0..self.active {
                m[(n + row) * size + n + col] = self.d.get(row, col);
            }
        }

        let mut rhs = Vec::with_capacity(size);
        rhs.extend_from_slice(&self.i);
        rhs.extend_from_slice(&self.e);
        (m, rhs)
    }

    /// Solve the system by Gauss-Jordan elimination with partial pivoting.
    ///
    /// Only an exactly-zero pivot column is reported as singular; badly
    /// conditioned systems solve to whatever elimination produces.
    pub fn solve(&self) -> Result<MatrixSolution> {
        let size = self.size();
        let (mut m, mut x) = self.assemble();

        for k in 0..size {
            // Find pivot
            let mut max_val = m[k * size + k].norm();
            let mut max_row = k;
            for row in (k + 1)..size {
                let val = m[row * size + k].norm();
                if val > max_val {
                    max_val = val;
                    max_row = row;
                }
            }

            if max_val == 0.0 {
                return Err(SimulationError::SingularMatrix { column: k });
            }

            if max_row != k {
                for col in 0..size {
                    m.swap(k * size + col, max_row * size + col);
                }
                x.swap(k, max_row);
            }

            // Normalize the pivot row
            let pivot = m[k * size + k];
            for col in k..size {
                m[k * size + col] /= pivot;
            }
            x[k] /= pivot;

            // Eliminate column k from every other row
            for row in 0..size {
                if row == k {
                    continue;
                }
                let factor = m[row * size + k];
                if factor == Complex64::new(0.0, 0.0) {
                    continue;
                }
                for col in k..size {
                    let v = m[k * size + col];
                    m[row * size + col] -= factor * v;
                }
                let v = x[k];
                x[row] -= factor * v;
            }
        }

        let currents = x.split_off(self.nodes);
        Ok(MatrixSolution { potentials: x, currents })
    }
}

fn check_shape(part: &'static str, expected: (usize, usize), actual: (usize, usize)) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(SimulationError::dimension_mismatch(part, expected, actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    #[test]
    fn test_zero_nodes_is_rejected() {
        assert!(matches!(
            AdmittanceMatrix::new(0, 1),
            Err(SimulationError::InvalidDimension { nodes: 0, active: 1 })
        ));
        assert!(AdmittanceMatrix::new(1, 0).is_ok());
    }

    #[test]
    fn test_setters_check_shape() {
        let mut m = AdmittanceMatrix::new(2, 1).unwrap();
        assert!(m.set_a(ComplexMatrix::zeros(2, 2)).is_ok());
        assert!(matches!(
            m.set_b(ComplexMatrix::zeros(1, 2)),
            Err(SimulationError::DimensionMismatch { part: "B", .. })
        ));
        assert!(m.set_c(ComplexMatrix::zeros(1, 2)).is_ok());
        assert!(m.set_d(ComplexMatrix::zeros(2, 2)).is_err());
        assert!(m.set_i(vec![c(0.0); 3]).is_err());
        assert!(m.set_e(vec![c(1.0)]).is_ok());
    }

    #[test]
    fn test_voltage_divider() {
        // V1 = 10 V on node 0, 1k from node 0 to node 1, 1k from node 1 to ground
        let g = 1e-3;
        let mut m = AdmittanceMatrix::new(2, 1).unwrap();
        let mut a = ComplexMatrix::zeros(2, 2);
        a.set(0, 0, c(g));
        a.set(0, 1, c(-g));
        a.set(1, 0, c(-g));
        a.set(1, 1, c(2.0 * g));
        m.set_a(a).unwrap();
        let mut b = ComplexMatrix::zeros(2, 1);
        b.set(0, 0, c(1.0));
        m.set_b(b).unwrap();
        let mut cm = ComplexMatrix::zeros(1, 2);
        cm.set(0, 0, c(1.0));
        m.set_c(cm).unwrap();
        m.set_e(vec![c(10.0)]).unwrap();

        let sol = m.solve().unwrap();
        assert_relative_eq!(sol.potentials[0].re, 10.0, epsilon = 1e-9);
        assert_relative_eq!(sol.potentials[1].re, 5.0, epsilon = 1e-9);
        // 5 mA flows out of the source's + terminal
        assert_relative_eq!(sol.currents[0].re, -5e-3, epsilon = 1e-12);
    }

    #[test]
    fn test_pivoting_handles_zero_diagonal() {
        // [0 1; 1 0] x = [2; 3]
        let mut m = AdmittanceMatrix::new(1, 1).unwrap();
        m.b_mut().set(0, 0, c(1.0));
        m.c_mut().set(0, 0, c(1.0));
        m.i_mut()[0] = c(2.0);
        m.e_mut()[0] = c(3.0);
        let sol = m.solve().unwrap();
        assert_relative_eq!(sol.potentials[0].re, 3.0);
        assert_relative_eq!(sol.currents[0].re, 2.0);
    }

    #[test]
    fn test_complex_solve() {
        // (1 + j) v = 2  =>  v = 1 - j
        let mut m = AdmittanceMatrix::new(1, 0).unwrap();
        m.a_mut().set(0, 0, Complex64::new(1.0, 1.0));
        m.i_mut()[0] = c(2.0);
        let sol = m.solve().unwrap();
        assert_relative_eq!(sol.potentials[0].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(sol.potentials[0].im, -1.0, epsilon = 1e-12);
        assert!(sol.currents.is_empty());
    }

    #[test]
    fn test_singular_matrix() {
        let m = AdmittanceMatrix::new(2, 0).unwrap();
        assert!(matches!(m.solve(), Err(SimulationError::SingularMatrix { column: 0 })));
    }
}
