// Copyright 2019
//     by  Centrality Investments Ltd.
//     and Parity Technologies (UK) Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::codec::DecodeError;
use uuid::Uuid;

/// Boxed error used as the cause slot of constructor and hook failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while mapping object graphs to and from bundles.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// No transformer is registered for a runtime type encountered during
	/// the discovery walk. The walk stops and the partial bundle is
	/// discarded.
	#[error("no transformer registered for type `{0}`")]
	UnserializableType(String),

	/// A type referenced while encoding type metadata has never been
	/// registered, so it has no stable GUID.
	#[error("type `{0}` is not registered")]
	UnregisteredType(&'static str),

	/// A GUID was registered twice for two distinct types or transformers.
	#[error("guid `{0}` is already registered")]
	DuplicateGuid(Uuid),

	/// A runtime type was registered twice.
	#[error("type `{0}` is already registered")]
	DuplicateType(&'static str),

	/// A storable registration names a parent type that has not been
	/// registered as storable yet.
	#[error("parent type `{0}` is not registered as storable")]
	UnregisteredParent(&'static str),

	/// The zero-argument constructor of a storable type failed during
	/// deserialization.
	#[error("constructing `{type_name}` failed")]
	ConstructorFailed {
		type_name: String,
		#[source]
		source: BoxedError,
	},

	/// A post-deserialization hook failed. The inner error is the hook's
	/// own error, propagated without further wrapping.
	#[error("post-deserialization hook on `{type_name}` failed")]
	HookFailed {
		type_name: String,
		#[source]
		source: BoxedError,
	},

	/// A bundle references a transformer GUID the registry does not know.
	/// Unlike unknown type GUIDs this is fatal: without the transformer no
	/// box can be interpreted.
	#[error("transformer guid `{0}` is not registered")]
	UnknownTransformer(Uuid),

	/// An id did not resolve against one of the mapper's tables.
	#[error("id {id} out of range for the {table} table of length {len}")]
	IdOutOfRange {
		table: &'static str,
		id: u32,
		len: usize,
	},

	/// A box payload does not have the form its transformer expects.
	/// Bundles cut short by cancellation also trip this: their tail boxes
	/// carry no payload at all.
	#[error("box payload does not have the form `{0}` expects")]
	UnexpectedPayload(&'static str),

	/// An object handed to a transformer does not downcast to the
	/// transformer's type.
	#[error("object does not have the runtime type `{0}` its box claims")]
	TypeMismatch(&'static str),

	/// An array value could not be rebuilt from its wire shape.
	#[error(transparent)]
	Shape(#[from] crate::ndarray::ShapeError),

	/// Structural errors raised by the envelope codec.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}
