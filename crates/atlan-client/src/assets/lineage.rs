//! Lineage processes.

use super::AssetKind;
use crate::model::{attr, qualified_name, Asset, AssetRef};
use crate::traits::{AtlanError, AtlanResult};

const INPUTS: &str = "inputs";
const OUTPUTS: &str = "outputs";

asset_type!(
    /// A transformation linking input assets to output assets.
    Process,
    "Process",
    ["Asset", "Referenceable"]
);

fn ref_qualified_name(reference: &AssetRef) -> AtlanResult<&str> {
    reference.qualified_name().ok_or_else(|| {
        AtlanError::InvalidRequest(format!(
            "Lineage endpoint of type {} must be referenced by qualifiedName",
            reference.type_name
        ))
    })
}

impl Process {
    /// A process from `inputs` to `outputs`.
    ///
    /// With a source-system `id` the qualified name is `connection/id`;
    /// otherwise it is derived from a digest of the name, connection, parent
    /// and endpoints, so the same lineage always maps to the same process.
    /// Without an `id`, endpoints must be referenced by qualified name.
    pub fn creator(
        name: &str,
        connection_qualified_name: &str,
        id: Option<&str>,
        inputs: Vec<AssetRef>,
        outputs: Vec<AssetRef>,
        parent: Option<AssetRef>,
    ) -> AtlanResult<Self> {
        qualified_name::validate_required(
            Self::TYPE_NAME,
            &[
                (attr::NAME, name),
                (attr::CONNECTION_QUALIFIED_NAME, connection_qualified_name),
            ],
        )?;
        qualified_name::require_depth(
            connection_qualified_name,
            qualified_name::CONNECTION_DEPTH,
            "connection",
        )?;
        if inputs.is_empty() && outputs.is_empty() {
            return Err(AtlanError::InvalidRequest(format!(
                "Process {} requires at least one input or output",
                name
            )));
        }

        let qn = match id.filter(|id| !id.is_empty()) {
            Some(id) => qualified_name::process_qualified_name(
                name,
                connection_qualified_name,
                Some(id),
                &[],
                &[],
                None,
            ),
            None => {
                let input_qns = inputs
                    .iter()
                    .map(ref_qualified_name)
                    .collect::<AtlanResult<Vec<_>>>()?;
                let output_qns = outputs
                    .iter()
                    .map(ref_qualified_name)
                    .collect::<AtlanResult<Vec<_>>>()?;
                let parent_qn = parent.as_ref().and_then(AssetRef::qualified_name);
                qualified_name::process_qualified_name(
                    name,
                    connection_qualified_name,
                    None,
                    &input_qns,
                    &output_qns,
                    parent_qn,
                )
            }
        };

        let connector = qualified_name::connector_of(connection_qualified_name)
            .map(|c| c.value())
            .unwrap_or_default();

        let mut asset = Asset::with_temporary_guid(Self::TYPE_NAME);
        asset.set_attribute(attr::NAME, name);
        asset.set_attribute(attr::QUALIFIED_NAME, qn);
        asset.set_attribute(attr::CONNECTOR_NAME, connector);
        asset.set_attribute(attr::CONNECTION_QUALIFIED_NAME, connection_qualified_name);
        asset.set_references(INPUTS, inputs);
        asset.set_references(OUTPUTS, outputs);
        if let Some(parent) = parent {
            asset.set_reference("parentConnectionProcess", parent);
        }
        Ok(Self(asset))
    }

    pub fn with_sql(self, sql: &str) -> Self {
        self.with_attribute("sql", sql)
    }

    pub fn with_code(self, code: &str) -> Self {
        self.with_attribute("code", code)
    }

    pub fn inputs(&self) -> Vec<AssetRef> {
        self.references(INPUTS)
    }

    pub fn outputs(&self) -> Vec<AssetRef> {
        self.references(OUTPUTS)
    }

    pub fn sql(&self) -> Option<&str> {
        self.str_attribute("sql")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Table, View};

    const CONNECTION: &str = "default/snowflake/1700000000";

    fn endpoints() -> (Vec<AssetRef>, Vec<AssetRef>) {
        (
            vec![Table::ref_by_qualified_name("default/snowflake/1700000000/DB/SCH/RAW")],
            vec![View::ref_by_qualified_name("default/snowflake/1700000000/DB/SCH/CLEAN")],
        )
    }

    #[test]
    fn test_process_with_id() {
        let (inputs, outputs) = endpoints();
        let process = Process::creator("load", CONNECTION, Some("dag-7"), inputs, outputs, None)
            .unwrap()
            .with_sql("insert into CLEAN select * from RAW");
        assert_eq!(process.qualified_name(), Some("default/snowflake/1700000000/dag-7"));
        assert_eq!(process.inputs().len(), 1);
        assert_eq!(process.outputs()[0].type_name, "View");
        assert_eq!(process.connector_name(), Some("snowflake"));
    }

    #[test]
    fn test_process_digest_is_stable() {
        let (inputs, outputs) = endpoints();
        let a = Process::creator("load", CONNECTION, None, inputs.clone(), outputs.clone(), None)
            .unwrap();
        let b = Process::creator("load", CONNECTION, None, inputs, outputs, None).unwrap();
        assert_eq!(a.qualified_name(), b.qualified_name());
        assert!(a.qualified_name().unwrap().starts_with(CONNECTION));
        assert_ne!(a.guid, b.guid);
    }

    #[test]
    fn test_process_digest_requires_qualified_names() {
        let inputs = vec![Table::ref_by_guid("b4113341-251b-4adc-81fb-2420501c30e6")];
        let err = Process::creator("load", CONNECTION, None, inputs, vec![], None).unwrap_err();
        assert!(matches!(err, AtlanError::InvalidRequest(_)));
    }

    #[test]
    fn test_process_requires_endpoints() {
        assert!(Process::creator("load", CONNECTION, Some("x"), vec![], vec![], None).is_err());
    }
}
