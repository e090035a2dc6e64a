#![allow(missing_docs)]
use crate::Point2;
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};

pub const SEED: &[u8; 32] = b"wPYxAkIiHcEmSBAxQFoXFrpYToCe1B71";
pub const SEED2: &[u8; 32] = b"14LzG37Y9EHTcmLW8vBDqWwtYsCeVVyF";

/// Faces of the 3x3 grid from [grid_9_points]. Every cell is split along (1, 1).
pub const GRID_9_FACES_A: [[usize; 3]; 8] = [
    [0, 1, 8],
    [0, 8, 7],
    [1, 2, 3],
    [1, 3, 8],
    [3, 4, 8],
    [8, 4, 5],
    [8, 5, 7],
    [7, 5, 6],
];

/// Faces of the 3x3 grid from [grid_9_points]. Every cell is split along (-1, 1).
pub const GRID_9_FACES_B: [[usize; 3]; 8] = [
    [0, 1, 7],
    [1, 8, 7],
    [1, 2, 8],
    [2, 3, 8],
    [3, 4, 5],
    [3, 5, 8],
    [5, 6, 8],
    [8, 6, 7],
];

/// The border of the square `[-1, 1]²` in counterclockwise order, followed by its center.
pub fn grid_9_points() -> Vec<Point2<f64>> {
    vec![
        Point2::new(-1.0, -1.0),
        Point2::new(0.0, -1.0),
        Point2::new(1.0, -1.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
        Point2::new(-1.0, 1.0),
        Point2::new(-1.0, 0.0),
        Point2::new(0.0, 0.0),
    ]
}

/// The square `[-1, 1]²` fanned around `center`, which becomes vertex 4.
pub fn square_with_center(center: Point2<f64>) -> (Vec<Point2<f64>>, Vec<[usize; 3]>) {
    let vertices = vec![
        Point2::new(-1.0, -1.0),
        Point2::new(1.0, -1.0),
        Point2::new(1.0, 1.0),
        Point2::new(-1.0, 1.0),
        center,
    ];
    let faces = vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
    (vertices, faces)
}

/// A grid of `size x size` cells with jittered vertices and randomly chosen cell diagonals.
pub fn jittered_grid(size: usize, seed: &[u8; 32]) -> (Vec<Point2<f64>>, Vec<[usize; 3]>) {
    let mut rng = rand::rngs::StdRng::from_seed(*seed);
    let jitter = Uniform::new_inclusive(-0.15, 0.15);
    let index = |x: usize, y: usize| y * (size + 1) + x;

    let mut points = Vec::with_capacity((size + 1) * (size + 1));
    for y in 0..=size {
        for x in 0..=size {
            points.push(Point2::new(
                x as f64 + jitter.sample(&mut rng),
                y as f64 + jitter.sample(&mut rng),
            ));
        }
    }

    let mut faces = Vec::with_capacity(size * size * 2);
    for y in 0..size {
        for x in 0..size {
            let (v00, v10) = (index(x, y), index(x + 1, y));
            let (v01, v11) = (index(x, y + 1), index(x + 1, y + 1));
            if rng.gen() {
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            } else {
                faces.push([v00, v10, v01]);
                faces.push([v10, v11, v01]);
            }
        }
    }
    (points, faces)
}

pub fn random_points_in_range(range: f64, size: usize, seed: &[u8; 32]) -> Vec<Point2<f64>> {
    let mut rng = rand::rngs::StdRng::from_seed(*seed);
    let range = Uniform::new(-range, range);
    let mut points = Vec::with_capacity(size);
    for _ in 0..size {
        let x = range.sample(&mut rng);
        let y = range.sample(&mut rng);
        points.push(Point2::new(x, y));
    }
    points
}
