//! Native type descriptor algebra
//!
//! - `native`: concrete native types and the `DataTypes` namespace
//! - `descriptor`: deferred type expressions and their evaluation
//! - `functions`: constructors producing tagged validation fragments

mod descriptor;
pub mod functions;
mod native;

pub use descriptor::{DataTypeRef, DescriptorArg, Modifiers, TypeDescriptor};
pub use native::{DataTypes, Modifier, NativeArg, NativeType, TypeClass};
