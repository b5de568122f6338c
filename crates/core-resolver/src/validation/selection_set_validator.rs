// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{HashMap, HashSet};

use async_graphql_parser::{
    Pos, Positioned,
    types::{Directive, Field, FragmentDefinition, FragmentSpread, Selection, SelectionSet},
};
use async_graphql_value::Name;

use fieldwise_model::{FieldDefinition, ObjectType, Schema, TypeDefinition};

use crate::validation::{
    field::{FieldBinding, TYPENAME_FIELD, ValidatedField},
    validation_error::ValidationError,
};

use super::arguments_validator::ArgumentValidator;

/// Context for validating a selection set.
pub struct SelectionSetValidator<'a, 'd, C, P> {
    schema: &'a Schema<C, P>,
    /// The parent type of this field.
    container_type: &'a ObjectType<C, P>,
    fragment_definitions: &'d HashMap<Name, Positioned<FragmentDefinition>>,
    max_depth: usize,
}

impl<'a, 'd, C, P> SelectionSetValidator<'a, 'd, C, P> {
    #[must_use]
    pub fn new(
        schema: &'a Schema<C, P>,
        container_type: &'a ObjectType<C, P>,
        fragment_definitions: &'d HashMap<Name, Positioned<FragmentDefinition>>,
        max_depth: usize,
    ) -> Self {
        Self {
            schema,
            container_type,
            fragment_definitions,
            max_depth,
        }
    }

    /// Validate selection set.
    ///
    /// Validations performed:
    /// - Each field is defined in the `container_type`
    /// - Each fragment referred is defined, applies to the `container_type` and does not (directly
    ///   or indirectly) spread itself
    /// - Arguments to each field are valid (see [ArgumentValidator] for more details)
    /// - Fields sharing a response key select the same field with the same arguments
    /// - No field is nested deeper than `max_depth`
    ///
    /// # Returns
    ///   A vector of validated fields (any fragment is resolved and inlined, and fields sharing a
    ///   response key are merged, thus normalizing the fields)
    pub(super) fn validate(
        &self,
        selection_set: &'d Positioned<SelectionSet>,
        depth: usize,
        fragment_stack: &mut Vec<&'d Name>,
    ) -> Result<Vec<ValidatedField<'a, C, P>>, ValidationError> {
        let mut fields = vec![];
        let mut collected_fragments = HashSet::new();
        self.collect_fields(
            selection_set,
            depth,
            fragment_stack,
            &mut collected_fragments,
            &mut fields,
        )?;
        merge_fields(fields)
    }

    /// Gather the fields of `selection_set`, inlining fragments.
    ///
    /// `collected_fragments` holds the fragments already inlined into this selection set; spreading
    /// one of them again would only add fields that merge away, so it is skipped.
    fn collect_fields(
        &self,
        selection_set: &'d Positioned<SelectionSet>,
        depth: usize,
        fragment_stack: &mut Vec<&'d Name>,
        collected_fragments: &mut HashSet<&'d Name>,
        fields: &mut Vec<ValidatedField<'a, C, P>>,
    ) -> Result<(), ValidationError> {
        for selection in &selection_set.node.items {
            match &selection.node {
                Selection::Field(field) => {
                    fields.push(self.validate_field(field, depth, fragment_stack)?);
                }
                Selection::FragmentSpread(fragment_spread) => {
                    reject_directives(&fragment_spread.node.directives)?;

                    let fragment_name = &fragment_spread.node.fragment_name.node;
                    if fragment_stack.contains(&fragment_name) {
                        return Err(ValidationError::FragmentCycle(
                            fragment_name.to_string(),
                            fragment_spread.pos,
                        ));
                    }

                    if !collected_fragments.insert(fragment_name) {
                        continue;
                    }

                    let fragment_definition = self.fragment_definition(fragment_spread)?;
                    reject_directives(&fragment_definition.directives)?;
                    self.check_type_condition(
                        &fragment_definition.type_condition.node.on.node,
                        fragment_spread.pos,
                    )?;

                    fragment_stack.push(fragment_name);
                    let collected = self.collect_fields(
                        &fragment_definition.selection_set,
                        depth,
                        fragment_stack,
                        collected_fragments,
                        fields,
                    );
                    fragment_stack.pop();
                    collected?;
                }
                Selection::InlineFragment(inline_fragment) => {
                    reject_directives(&inline_fragment.node.directives)?;

                    if let Some(type_condition) = &inline_fragment.node.type_condition {
                        self.check_type_condition(&type_condition.node.on.node, type_condition.pos)?;
                    }

                    self.collect_fields(
                        &inline_fragment.node.selection_set,
                        depth,
                        fragment_stack,
                        collected_fragments,
                        fields,
                    )?;
                }
            }
        }

        Ok(())
    }

    fn validate_field(
        &self,
        field: &'d Positioned<Field>,
        depth: usize,
        fragment_stack: &mut Vec<&'d Name>,
    ) -> Result<ValidatedField<'a, C, P>, ValidationError> {
        if depth > self.max_depth {
            return Err(ValidationError::SelectionSetTooDeep(field.pos));
        }
        reject_directives(&field.node.directives)?;

        let alias = field.node.alias.as_ref().map(|alias| alias.node.clone());
        let name = field.node.name.node.clone();

        // Special treatment for the __typename field, since it is not declared on any type
        if name.as_str() == TYPENAME_FIELD {
            return if !field.node.arguments.is_empty() {
                Err(ValidationError::StrayArguments(
                    field
                        .node
                        .arguments
                        .iter()
                        .map(|arg| arg.0.node.to_string())
                        .collect(),
                    name.to_string(),
                    field.pos,
                ))
            } else if !field.node.selection_set.node.items.is_empty() {
                Err(ValidationError::ScalarWithField(name.to_string(), field.pos))
            } else {
                Ok(ValidatedField {
                    alias,
                    name,
                    arguments: Default::default(),
                    binding: FieldBinding::Typename,
                    subfields: vec![],
                    pos: field.pos,
                })
            };
        }

        let field_definition = self.get_field_definition(field)?;
        let has_selection = !field.node.selection_set.node.items.is_empty();

        let subfields = match self.schema.underlying_type(&field_definition.ty) {
            Some(TypeDefinition::Scalar(_)) if has_selection => {
                return Err(ValidationError::ScalarWithField(name.to_string(), field.pos));
            }
            Some(TypeDefinition::Scalar(_)) => vec![],
            Some(TypeDefinition::Object(object_type)) if has_selection => {
                let subfield_validator = SelectionSetValidator::new(
                    self.schema,
                    object_type,
                    self.fragment_definitions,
                    self.max_depth,
                );
                subfield_validator.validate(&field.node.selection_set, depth + 1, fragment_stack)?
            }
            Some(TypeDefinition::Object(_)) => {
                return Err(ValidationError::ObjectWithoutFields(
                    name.to_string(),
                    field_definition.ty.to_string(),
                    field.pos,
                ));
            }
            None => {
                return Err(ValidationError::InvalidFieldType(
                    field_definition.ty.innermost_name().to_string(),
                    field.pos,
                ));
            }
        };

        let arguments =
            ArgumentValidator::new(self.schema, field).validate(&field_definition.arguments)?;

        Ok(ValidatedField {
            alias,
            name,
            arguments,
            binding: FieldBinding::Defined(field_definition),
            subfields,
            pos: field.pos,
        })
    }

    fn fragment_definition(
        &self,
        fragment: &Positioned<FragmentSpread>,
    ) -> Result<&'d FragmentDefinition, ValidationError> {
        self.fragment_definitions
            .get(&fragment.node.fragment_name.node)
            .map(|v| &v.node)
            .ok_or_else(|| {
                ValidationError::FragmentDefinitionNotFound(
                    fragment.node.fragment_name.node.as_str().to_string(),
                    fragment.pos,
                )
            })
    }

    fn check_type_condition(&self, type_name: &Name, pos: Pos) -> Result<(), ValidationError> {
        if type_name.as_str() == self.container_type.name {
            Ok(())
        } else {
            Err(ValidationError::FragmentTypeMismatch(
                type_name.to_string(),
                self.container_type.name.clone(),
                pos,
            ))
        }
    }

    fn get_field_definition(
        &self,
        field: &Positioned<Field>,
    ) -> Result<&'a FieldDefinition<C, P>, ValidationError> {
        self.container_type
            .field(field.node.name.node.as_str())
            .ok_or_else(|| {
                ValidationError::InvalidField(
                    field.node.name.node.as_str().to_string(),
                    self.container_type.name.clone(),
                    field.pos,
                )
            })
    }
}

/// Fold fields sharing a response key into the first of them, concatenating (and then merging)
/// their subfields.
fn merge_fields<'a, C, P>(
    fields: Vec<ValidatedField<'a, C, P>>,
) -> Result<Vec<ValidatedField<'a, C, P>>, ValidationError> {
    let mut merged: Vec<ValidatedField<'a, C, P>> = Vec::with_capacity(fields.len());

    for field in fields {
        match merged
            .iter_mut()
            .find(|existing| existing.output_name() == field.output_name())
        {
            Some(existing) => {
                if existing.name != field.name || existing.arguments != field.arguments {
                    return Err(ValidationError::UnmergeableFields(
                        field.output_name().to_string(),
                        field.pos,
                    ));
                }

                if !field.subfields.is_empty() {
                    let subfields = std::mem::take(&mut existing.subfields);
                    existing.subfields =
                        merge_fields(subfields.into_iter().chain(field.subfields).collect())?;
                }
            }
            None => merged.push(field),
        }
    }

    Ok(merged)
}

pub(super) fn reject_directives(
    directives: &[Positioned<Directive>],
) -> Result<(), ValidationError> {
    match directives.first() {
        Some(directive) => Err(ValidationError::DirectiveNotSupported(
            directive.node.name.node.to_string(),
            directive.pos,
        )),
        None => Ok(()),
    }
}
